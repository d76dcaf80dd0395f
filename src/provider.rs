//! Interfaces to the services that fetch & parse documents, buffers, and images.
//!
//! A [SceneResolver](crate::SceneResolver) never performs I/O itself; everything goes through a
//! [DocumentProvider] injected at construction.

#[cfg(feature = "fs")]
pub mod fs;

use std::{future::Future, ops::Deref};

use url::Url;

use crate::{document::Document, error::BoxError};

/// Raw bytes of a glTF buffer.
#[derive(Debug)]
pub enum BufferData {
    /// Bytes held in memory
    Owned(Vec<u8>),
    /// A read-only memory map of a local file
    #[cfg(feature = "fs")]
    Mapped(fs::MappedFile),
}

impl From<Vec<u8>> for BufferData {
    fn from(value: Vec<u8>) -> Self {
        Self::Owned(value)
    }
}

impl Deref for BufferData {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        match self {
            Self::Owned(data) => data,
            #[cfg(feature = "fs")]
            Self::Mapped(file) => file,
        }
    }
}

/// The result of [DocumentProvider::load].
#[derive(Debug)]
pub struct LoadedDocument<B, I> {
    /// The parsed document
    pub document: Document,
    /// Fetches the buffers referenced by `document`
    pub buffers: B,
    /// Fetches & decodes the images referenced by `document`
    pub images: I,
    /// Location against which relative URIs in `document` are resolved
    pub base_uri: Url,
}

/// Fetches & parses glTF documents.
pub trait DocumentProvider {
    /// Buffer fetcher handed out with each loaded document
    type Buffers: BufferProvider;
    /// Image fetcher handed out with each loaded document
    type Images: ImageProvider;

    /// Fetch & parse the document at `uri`.
    fn load(
        &self,
        uri: &Url,
    ) -> impl Future<Output = Result<LoadedDocument<Self::Buffers, Self::Images>, BoxError>> + Send;
}

/// Fetches the raw bytes behind a resolved buffer URI.
pub trait BufferProvider {
    /// Fetch the bytes at `uri`, already resolved against the document's location.
    fn load(&self, uri: &Url) -> impl Future<Output = Result<BufferData, BoxError>> + Send;
}

/// Fetches & decodes images by their index within a document.
pub trait ImageProvider {
    /// A fetched (possibly decoded) image
    type Image;

    /// Fetch the image at `index` within the document's `images`.
    fn image(&self, index: usize) -> impl Future<Output = Result<Self::Image, BoxError>> + Send;
}
