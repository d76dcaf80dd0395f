//! Resolution of glTF 2.0 documents into typed scene data.
//!
//! A [SceneResolver] owns one loaded [Document](document::Document) at a time. It looks up
//! scenes, nodes, meshes, materials, textures, & samplers by index, and decodes the binary data
//! behind accessors through a per-document [BufferCache](cache::BufferCache).
//!
//! All I/O is delegated to an injected [DocumentProvider](provider::DocumentProvider); with the
//! default `fs` feature, [provider::fs::FsProvider] reads documents from the local filesystem.
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod accessor;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod provider;
mod resolver;
pub mod scene;

pub use accessor::{DecodedSlice, TypedData};
pub use config::{ComponentMapping, ImageLookup, ResolverConfig, SamplerLookup};
pub use error::Error;
pub use resolver::SceneResolver;
