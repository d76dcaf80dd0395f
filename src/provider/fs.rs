//! A [DocumentProvider] reading `.gltf` documents from the local filesystem.
//!
//! Buffers & images may be referenced by `file:` URIs (memory-mapped, or read whole) or by base64
//! `data:` URIs.

use std::{
    io,
    ops::Deref,
    path::{Path, PathBuf},
};

use base64::Engine;
use memmap2::Mmap;
use url::Url;

use super::{BufferData, BufferProvider, DocumentProvider, ImageProvider, LoadedDocument};
use crate::{
    document::{Document, Image},
    error::BoxError,
};

/// Errors related to [FsProviders](FsProvider).
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum FsError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("expected file, found directory: {0:?}")]
    IsADirectory(PathBuf),
    #[error("could not convert {0:?} into a file url")]
    NotAFilePath(PathBuf),
    #[error("could not convert {0} into a local file path")]
    NotALocalUrl(Url),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("expected local file path or data uri; instead, found: {0:?}")]
    UnsupportedUriScheme(String),
    #[error("data uri is missing its payload separator")]
    MalformedDataUri,
    #[error("only base64 data uris are supported")]
    UnsupportedDataUriEncoding,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error("image index out of range: {0}")]
    ImageNotFound(usize),
    #[error("image {0} is stored in a buffer view, which is unsupported")]
    ImageInBufferView(usize),
}

/// Convert a filesystem path into the absolute `file:` url expected by [DocumentProvider::load].
pub fn file_url(path: impl AsRef<Path>) -> Result<Url, FsError> {
    let path: PathBuf = path.as_ref().canonicalize()?;
    if path.is_dir() {
        return Err(FsError::IsADirectory(path));
    }
    // only fails for relative paths, which canonicalize() never returns
    Url::from_file_path(&path).map_err(|()| FsError::NotAFilePath(path))
}

/// A read-only memory map of a buffer file.
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    map: Mmap,
}

impl MappedFile {
    /// Map the file at `path`.
    #[allow(unsafe_code)]
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, io::Error> {
        let path = path.into();
        tracing::trace!(path = ?path, "memory-mapping glTF buffer");
        let file = tokio::fs::File::open(&path).await?.into_std().await;
        // SAFETY: the map is never written through; the file must not be truncated while mapped
        let map = unsafe { Mmap::map(&file)? };
        Ok(Self { path, map })
    }

    /// Path of the mapped file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Deref for MappedFile {
    type Target = [u8];
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

/// An image as stored in the document, left undecoded.
#[derive(Debug)]
pub struct EncodedImage {
    /// Encoded image bytes (PNG, JPEG, ...)
    pub bytes: BufferData,
    /// The document's `mimeType` for the image, if given
    pub mime_type: Option<String>,
}

/// Loads glTF documents, buffers, & images from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProvider {
    /// Whether to memory-map buffer files rather than reading them into memory.
    pub map_files: bool,
}

impl FsProvider {
    /// A provider that reads buffers into memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that memory-maps buffer files.
    pub fn mapped() -> Self {
        Self { map_files: true }
    }
}

impl DocumentProvider for FsProvider {
    type Buffers = FsBuffers;
    type Images = FsImages;

    #[tracing::instrument(skip(self, uri), fields(uri = uri.as_str()))]
    async fn load(&self, uri: &Url) -> Result<LoadedDocument<FsBuffers, FsImages>, BoxError> {
        let json = read_uri(uri, false).await?;
        let document = Document::from_slice(&json)?;
        tracing::debug!(
            scenes = document.scenes.len(),
            nodes = document.nodes.len(),
            buffers = document.buffers.len(),
            "parsed glTF document"
        );
        let images = FsImages {
            base_uri: uri.clone(),
            images: document.images.clone(),
            map_files: self.map_files,
        };
        Ok(LoadedDocument {
            document,
            buffers: FsBuffers {
                map_files: self.map_files,
            },
            images,
            base_uri: uri.clone(),
        })
    }
}

/// [BufferProvider] half of an [FsProvider].
#[derive(Debug, Clone, Copy)]
pub struct FsBuffers {
    map_files: bool,
}

impl BufferProvider for FsBuffers {
    async fn load(&self, uri: &Url) -> Result<BufferData, BoxError> {
        Ok(read_uri(uri, self.map_files).await?)
    }
}

/// [ImageProvider] half of an [FsProvider].
#[derive(Debug, Clone)]
pub struct FsImages {
    base_uri: Url,
    images: Vec<Image>,
    map_files: bool,
}

impl FsImages {
    async fn load(&self, index: usize) -> Result<EncodedImage, FsError> {
        let image = self.images.get(index).ok_or(FsError::ImageNotFound(index))?;
        let uri = image
            .uri
            .as_deref()
            .ok_or(FsError::ImageInBufferView(index))?;
        let uri = self.base_uri.join(uri)?;
        tracing::debug!(url = uri.as_str(), "loading glTF image");
        Ok(EncodedImage {
            bytes: read_uri(&uri, self.map_files).await?,
            mime_type: image.mime_type.as_ref().map(|m| m.0.clone()),
        })
    }
}

impl ImageProvider for FsImages {
    type Image = EncodedImage;

    async fn image(&self, index: usize) -> Result<EncodedImage, BoxError> {
        Ok(self.load(index).await?)
    }
}

async fn read_uri(uri: &Url, map_files: bool) -> Result<BufferData, FsError> {
    match uri.scheme() {
        "file" => {
            let path = uri
                .to_file_path()
                .map_err(|()| FsError::NotALocalUrl(uri.clone()))?;
            if map_files {
                Ok(BufferData::Mapped(MappedFile::open(path).await?))
            } else {
                Ok(BufferData::Owned(tokio::fs::read(path).await?))
            }
        }
        "data" => decode_data_uri(uri.as_str()).map(BufferData::Owned),
        scheme => Err(FsError::UnsupportedUriScheme(scheme.to_owned())),
    }
}

/// Decode `data:[<mediatype>];base64,<payload>`.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, FsError> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(FsError::MalformedDataUri)?;
    if !header.ends_with(";base64") {
        return Err(FsError::UnsupportedDataUriEncoding);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}
