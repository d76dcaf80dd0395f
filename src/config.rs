//! Behavioural switches for a [SceneResolver](crate::SceneResolver).

use gltf::accessor::DataType;

use crate::document::ComponentType;

/// How accessor component types are mapped onto decoded element types.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ComponentMapping {
    /// Every glTF component type decodes to its own width & signedness. Unrecognized codes decode
    /// as bytes.
    #[default]
    Full,
    /// Only `UNSIGNED_SHORT` and `FLOAT` are recognized; everything else decodes as unsigned bytes.
    ///
    /// Loses precision for `SHORT` and `UNSIGNED_INT` data, and signedness for `BYTE` data.
    Legacy,
}

impl ComponentMapping {
    /// The element type a view of the given component type decodes to.
    pub fn resolve(self, component_type: ComponentType) -> DataType {
        match self {
            Self::Full => component_type.data_type().unwrap_or(DataType::U8),
            Self::Legacy => match component_type {
                ComponentType::UNSIGNED_SHORT => DataType::U16,
                ComponentType::FLOAT => DataType::F32,
                _ => DataType::U8,
            },
        }
    }
}

impl std::fmt::Display for ComponentMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentMapping::Full => f.write_str("full"),
            ComponentMapping::Legacy => f.write_str("legacy"),
        }
    }
}

/// How [SceneResolver::sampler](crate::SceneResolver::sampler) interprets its index.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SamplerLookup {
    /// Always return the first sampler, whatever index is requested.
    #[default]
    AlwaysFirst,
    /// Return the sampler at the requested index.
    Positional,
}

impl std::fmt::Display for SamplerLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerLookup::AlwaysFirst => f.write_str("always-first"),
            SamplerLookup::Positional => f.write_str("positional"),
        }
    }
}

/// How [SceneResolver::image](crate::SceneResolver::image) interprets its index.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ImageLookup {
    /// Hand the index to the image provider unchanged.
    #[default]
    Passthrough,
    /// Treat the index as a texture index and fetch that texture's `source` image.
    TextureSource,
}

impl std::fmt::Display for ImageLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageLookup::Passthrough => f.write_str("passthrough"),
            ImageLookup::TextureSource => f.write_str("texture-source"),
        }
    }
}

/// Settings for a [SceneResolver](crate::SceneResolver); the default reproduces the behaviour of
/// existing viewers.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct ResolverConfig {
    /// See [ComponentMapping]
    pub component_mapping: ComponentMapping,
    /// See [SamplerLookup]
    pub sampler_lookup: SamplerLookup,
    /// See [ImageLookup]
    pub image_lookup: ImageLookup,
}

impl ResolverConfig {
    /// Set [Self::component_mapping].
    #[inline]
    pub fn with_component_mapping(mut self, component_mapping: ComponentMapping) -> Self {
        self.component_mapping = component_mapping;
        self
    }

    /// Set [Self::sampler_lookup].
    #[inline]
    pub fn with_sampler_lookup(mut self, sampler_lookup: SamplerLookup) -> Self {
        self.sampler_lookup = sampler_lookup;
        self
    }

    /// Set [Self::image_lookup].
    #[inline]
    pub fn with_image_lookup(mut self, image_lookup: ImageLookup) -> Self {
        self.image_lookup = image_lookup;
        self
    }
}
