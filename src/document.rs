//! The parsed form of a glTF document, as handed over by a [DocumentProvider](crate::provider::DocumentProvider).
//!
//! Records the resolver never interprets (nodes, meshes, materials, ...) reuse the JSON types from the
//! [gltf] crate. Scenes, accessors, buffer views, and buffers are modelled here instead, since they
//! must survive documents `gltf` would reject (ex. scenes without `nodes`, unrecognized component
//! types).
//!
//! # See Also
//!
//! * [glTF 2.0 Spec](https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html)

use gltf::{accessor::DataType, json};
use serde::Deserialize;

/// A node of the scene hierarchy.
pub type Node = json::Node;
/// A set of primitives to render.
pub type Mesh = json::Mesh;
/// The appearance of a primitive.
pub type Material = json::Material;
/// An image paired with a sampler.
pub type Texture = json::Texture;
/// Filtering & wrapping modes for a texture.
pub type Sampler = json::texture::Sampler;
/// Image data referenced by a URI or buffer view.
pub type Image = json::Image;

/// The collections of a single glTF document.
///
/// Every collection is optional in the source JSON; absent ones deserialize as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Document {
    /// If extant, the index of the default scene
    #[serde(default)]
    pub scene: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub textures: Vec<Texture>,
    #[serde(default)]
    pub samplers: Vec<Sampler>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
}

impl Document {
    /// Parse a document from glTF JSON.
    pub fn from_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    /// The index of the scene a viewer should show first.
    #[inline]
    pub fn default_scene_index(&self) -> usize {
        self.scene.unwrap_or(0)
    }
}

/// A set of root nodes to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scene {
    /// Indices of the scene's root nodes; may be absent, in which case the scene is empty
    #[serde(default)]
    pub nodes: Vec<usize>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// The numeric `componentType` code of an [Accessor].
///
/// Kept as the raw code so that documents with unrecognized codes still load; see
/// [ComponentType::data_type].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ComponentType(pub u32);

impl ComponentType {
    /// `i8`
    pub const BYTE: Self = Self(5120);
    /// `u8`
    pub const UNSIGNED_BYTE: Self = Self(5121);
    /// `i16`
    pub const SHORT: Self = Self(5122);
    /// `u16`
    pub const UNSIGNED_SHORT: Self = Self(5123);
    /// `u32`
    pub const UNSIGNED_INT: Self = Self(5125);
    /// `f32`
    pub const FLOAT: Self = Self(5126);

    /// The [DataType] this code names, if it's one of the six defined by glTF 2.0.
    pub fn data_type(self) -> Option<DataType> {
        match self {
            Self::BYTE => Some(DataType::I8),
            Self::UNSIGNED_BYTE => Some(DataType::U8),
            Self::SHORT => Some(DataType::I16),
            Self::UNSIGNED_SHORT => Some(DataType::U16),
            Self::UNSIGNED_INT => Some(DataType::U32),
            Self::FLOAT => Some(DataType::F32),
            _ => None,
        }
    }
}

impl From<DataType> for ComponentType {
    fn from(value: DataType) -> Self {
        match value {
            DataType::I8 => Self::BYTE,
            DataType::U8 => Self::UNSIGNED_BYTE,
            DataType::I16 => Self::SHORT,
            DataType::U16 => Self::UNSIGNED_SHORT,
            DataType::U32 => Self::UNSIGNED_INT,
            DataType::F32 => Self::FLOAT,
        }
    }
}

/// Describes how to interpret a run of bytes within a [BufferView] as numeric data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    /// Defaults to buffer view 0 when omitted.
    #[serde(default)]
    pub buffer_view: Option<usize>,
    /// Offset of the first element, relative to the start of the buffer view.
    #[serde(default)]
    pub byte_offset: Option<usize>,
    /// Raw component type code, kept even if unrecognized
    pub component_type: ComponentType,
    /// Number of elements
    pub count: usize,
    /// `SCALAR`, `VEC2`, ..., `MAT4`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Whether integer components map onto `[0, 1]` or `[-1, 1]`
    #[serde(default)]
    pub normalized: bool,
    /// Sparse overrides are never applied; kept so their presence can be reported.
    #[serde(default)]
    pub sparse: Option<serde_json::Value>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

impl Accessor {
    /// Number of components per element, as given by the accessor's `type`.
    pub fn components(&self) -> Option<usize> {
        match self.kind.as_deref()? {
            "SCALAR" => Some(1),
            "VEC2" => Some(2),
            "VEC3" => Some(3),
            "VEC4" | "MAT2" => Some(4),
            "MAT3" => Some(9),
            "MAT4" => Some(16),
            _ => None,
        }
    }
}

/// A byte range `[byte_offset, byte_offset + byte_length)` of a [Buffer].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Index of the viewed buffer
    pub buffer: usize,
    /// Start of the view within the buffer; `None` means zero
    #[serde(default)]
    pub byte_offset: Option<usize>,
    /// Length of the view in bytes
    pub byte_length: usize,
    /// Distance in bytes between the starts of consecutive elements; `None` means tightly packed.
    #[serde(default)]
    pub byte_stride: Option<usize>,
    /// Intended GPU buffer binding (`ARRAY_BUFFER` or `ELEMENT_ARRAY_BUFFER`)
    #[serde(default)]
    pub target: Option<u32>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

impl BufferView {
    /// The range of bytes this view covers within its buffer.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.byte_offset.unwrap_or(0);
        start..start.saturating_add(self.byte_length)
    }
}

/// A binary blob referenced by a URI relative to its document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Declared length in bytes
    pub byte_length: usize,
    /// `None` refers to the binary chunk of a GLB container, which isn't supported.
    #[serde(default)]
    pub uri: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}
