use url::Url;

use crate::{
    accessor::{self, trace_accessor, DecodedSlice},
    cache::BufferCache,
    config::{ImageLookup, ResolverConfig, SamplerLookup},
    document::{Accessor, BufferView, Document, Material, Mesh, Node, Sampler, Scene, Texture},
    error::{EntityKind, Error},
    provider::{DocumentProvider, ImageProvider, LoadedDocument},
    scene::{self, SceneNode},
};

/// State belonging to one successfully loaded document.
struct Loaded<B, I> {
    document: Document,
    cache: BufferCache<B>,
    images: I,
}

/// Resolves the entities & binary data of a glTF document by index.
///
/// Documents are fetched through the [DocumentProvider] given at construction. Each call to
/// [load](Self::load) discards everything known about the previous document; because it takes
/// `&mut self`, it can never overlap with another load or with an in-flight data/image request.
pub struct SceneResolver<P: DocumentProvider> {
    provider: P,
    config: ResolverConfig,
    loaded: Option<Loaded<P::Buffers, P::Images>>,
}

impl<P: DocumentProvider + std::fmt::Debug> std::fmt::Debug for SceneResolver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneResolver")
            .field("provider", &self.provider)
            .field("config", &self.config)
            .field("base_uri", &self.base_uri())
            .finish_non_exhaustive()
    }
}

impl<P: DocumentProvider> SceneResolver<P> {
    /// Create an empty resolver with the default [ResolverConfig].
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    /// Create an empty resolver.
    pub fn with_config(provider: P, config: ResolverConfig) -> Self {
        Self {
            provider,
            config,
            loaded: None,
        }
    }

    /// The settings this resolver was created with.
    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The provider documents are loaded through.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Replace the current document with the one at `uri`.
    ///
    /// Prior state is cleared before the provider is consulted, so on failure (or if the returned
    /// future is dropped before completion) the resolver is left empty.
    #[tracing::instrument(skip(self, uri), fields(uri = uri.as_ref()))]
    pub async fn load(&mut self, uri: impl AsRef<str>) -> Result<(), Error> {
        self.loaded = None;

        let uri = Url::parse(uri.as_ref())?;
        let LoadedDocument {
            document,
            buffers,
            images,
            base_uri,
        } = self.provider.load(&uri).await.map_err(Error::Provider)?;

        tracing::debug!(
            base_uri = base_uri.as_str(),
            scenes = document.scenes.len(),
            nodes = document.nodes.len(),
            meshes = document.meshes.len(),
            accessors = document.accessors.len(),
            buffers = document.buffers.len(),
            "loaded glTF document"
        );
        self.loaded = Some(Loaded {
            cache: BufferCache::new(buffers, base_uri, document.buffers.clone()),
            document,
            images,
        });
        Ok(())
    }

    /// Whether the last [load](Self::load) succeeded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// The currently loaded document, if any.
    #[inline]
    pub fn document(&self) -> Option<&Document> {
        self.loaded.as_ref().map(|l| &l.document)
    }

    /// The buffer cache of the currently loaded document, if any.
    #[inline]
    pub fn buffers(&self) -> Option<&BufferCache<P::Buffers>> {
        self.loaded.as_ref().map(|l| &l.cache)
    }

    /// Location against which the current document's relative URIs are resolved.
    #[inline]
    pub fn base_uri(&self) -> Option<&Url> {
        self.buffers().map(BufferCache::base_uri)
    }

    fn loaded(&self) -> Result<&Loaded<P::Buffers, P::Images>, Error> {
        self.loaded.as_ref().ok_or(Error::NotLoaded)
    }

    /// The document's default scene, or its first scene if it doesn't specify a default.
    pub fn scene(&self) -> Option<&Scene> {
        let doc = self.document()?;
        doc.scenes.get(doc.default_scene_index())
    }

    /// The node at `index`, if any.
    #[inline]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.document()?.nodes.get(index)
    }

    /// The mesh at `index`, if any.
    #[inline]
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.document()?.meshes.get(index)
    }

    /// The material at `index`, if any.
    #[inline]
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.document()?.materials.get(index)
    }

    /// The texture at `index`, if any.
    #[inline]
    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.document()?.textures.get(index)
    }

    /// The accessor at `index`, if any.
    #[inline]
    pub fn accessor(&self, index: usize) -> Option<&Accessor> {
        self.document()?.accessors.get(index)
    }

    /// The buffer view at `index`, if any.
    #[inline]
    pub fn buffer_view(&self, index: usize) -> Option<&BufferView> {
        self.document()?.buffer_views.get(index)
    }

    /// Look up a sampler, as governed by [ResolverConfig::sampler_lookup].
    ///
    /// With the default [SamplerLookup::AlwaysFirst], this returns the first sampler no matter
    /// which index is requested.
    pub fn sampler(&self, index: usize) -> Option<&Sampler> {
        let samplers = &self.document()?.samplers;
        match self.config.sampler_lookup {
            SamplerLookup::AlwaysFirst => {
                if index != 0 {
                    tracing::debug!(index, "substituting sampler 0 for requested sampler");
                }
                samplers.first()
            }
            SamplerLookup::Positional => samplers.get(index),
        }
    }

    /// The sampler referenced by the texture at `texture_index`, looked up positionally.
    pub fn texture_sampler(&self, texture_index: usize) -> Option<&Sampler> {
        let sampler = self.texture(texture_index)?.sampler.as_ref()?.value();
        self.document()?.samplers.get(sampler)
    }

    /// Decode the buffer view behind the accessor at `index`.
    ///
    /// The returned [DecodedSlice] holds the entire buffer view; `offset` & `stride` are passed
    /// through from the accessor & view for the caller to apply.
    #[tracing::instrument(skip(self))]
    pub async fn data(&self, index: usize) -> Result<DecodedSlice, Error> {
        let Loaded {
            document: doc,
            cache,
            ..
        } = self.loaded()?;
        if doc.buffers.is_empty() {
            return Err(Error::MissingBuffers);
        }

        let acc = doc
            .accessors
            .get(index)
            .ok_or(Error::not_found(EntityKind::Accessor, index))?;
        trace_accessor!(index, acc, "decoding accessor");
        if acc.sparse.is_some() {
            tracing::warn!(index, "sparse accessor overrides are not applied");
        }

        let view_index = acc.buffer_view.unwrap_or(0);
        let view = doc
            .buffer_views
            .get(view_index)
            .ok_or(Error::not_found(EntityKind::BufferView, view_index))?;
        let buffer = cache.get(view.buffer).await?;

        let data_type = self.config.component_mapping.resolve(acc.component_type);
        Ok(DecodedSlice {
            data: accessor::decode(&buffer, view_index, view, data_type)?,
            offset: acc.byte_offset,
            stride: view.byte_stride,
        })
    }

    /// Fetch an image through the document's [ImageProvider], as governed by
    /// [ResolverConfig::image_lookup].
    ///
    /// With the default [ImageLookup::Passthrough], `index` is handed to the provider unchanged;
    /// with [ImageLookup::TextureSource], it names a texture whose `source` image is fetched.
    #[tracing::instrument(skip(self))]
    pub async fn image(&self, index: usize) -> Result<<P::Images as ImageProvider>::Image, Error> {
        let loaded = self.loaded()?;
        let image = match self.config.image_lookup {
            ImageLookup::Passthrough => index,
            ImageLookup::TextureSource => loaded
                .document
                .textures
                .get(index)
                .ok_or(Error::not_found(EntityKind::Texture, index))?
                .source
                .value(),
        };
        loaded.images.image(image).await.map_err(Error::Provider)
    }

    /// Walk the default scene; see [scene::walk].
    pub fn walk_scene(&self) -> Result<Vec<SceneNode>, Error> {
        let doc = &self.loaded()?.document;
        let index = doc.default_scene_index();
        let scene = doc
            .scenes
            .get(index)
            .ok_or(Error::not_found(EntityKind::Scene, index))?;
        scene::walk(doc, scene)
    }
}
