//! Errors returned while resolving a document.

/// Boxed error type returned by [providers](crate::provider).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The kind of entity referenced by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EntityKind {
    Scene,
    Node,
    Mesh,
    Material,
    Texture,
    Sampler,
    Image,
    Accessor,
    BufferView,
    Buffer,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Scene => "scene",
            EntityKind::Node => "node",
            EntityKind::Mesh => "mesh",
            EntityKind::Material => "material",
            EntityKind::Texture => "texture",
            EntityKind::Sampler => "sampler",
            EntityKind::Image => "image",
            EntityKind::Accessor => "accessor",
            EntityKind::BufferView => "buffer view",
            EntityKind::Buffer => "buffer",
        })
    }
}

/// Errors related to [SceneResolvers](crate::SceneResolver).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No document has been loaded, or the last load failed
    #[error("attempted to access document data before a document was loaded")]
    NotLoaded,
    /// The document declares no buffers, so no accessor can be decoded
    #[error("no buffers found in document")]
    MissingBuffers,
    /// An index referred past the end of its collection
    #[error("{kind} index out of range: {index}")]
    #[allow(missing_docs)]
    NotFound { kind: EntityKind, index: usize },
    /// The buffer lives in a GLB binary chunk
    #[error("buffer {0} has no uri; embedded binary chunks are unsupported")]
    EmbeddedBufferUnsupported(usize),
    /// A buffer view reaches past the end of its buffer's data
    #[error("buffer view {view} spans bytes {start}..{end}, but its buffer is only {len} bytes long")]
    #[allow(missing_docs)]
    ViewOutOfRange {
        view: usize,
        start: usize,
        end: usize,
        len: usize,
    },
    /// A buffer view doesn't hold a whole number of elements
    #[error("buffer view {view} is {len} bytes long, which is not a multiple of the element size ({element_size})")]
    #[allow(missing_docs)]
    MisalignedView {
        view: usize,
        len: usize,
        element_size: usize,
    },
    /// A node is its own ancestor, or has more than one parent
    #[error("node {0} was reached more than once while walking the scene")]
    NodeCycle(usize),
    /// A document or buffer URI couldn't be parsed
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// The document, buffer, or image provider failed
    #[error("provider failure: {0}")]
    Provider(#[source] BoxError),
}

impl Error {
    #[inline]
    pub(crate) fn not_found(kind: EntityKind, index: usize) -> Self {
        Self::NotFound { kind, index }
    }
}
