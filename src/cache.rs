//! Per-document memoization of buffer bytes.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError},
};

use crossbeam::sync::ShardedLock;
use tokio::sync::OnceCell;
use url::Url;

use crate::{
    document::Buffer,
    error::{EntityKind, Error},
    provider::{BufferData, BufferProvider},
};

/// Shared handle to the bytes of a cached buffer.
pub type BufferBytes = Arc<BufferData>;

/// Cache of `glTF` buffer data for a single loaded document, keyed by buffer index.
///
/// Each buffer is fetched at most once. Concurrent first requests for the same index wait on a
/// single fetch; a failed fetch is not cached, so a later request tries again.
#[derive(Debug)]
pub struct BufferCache<B> {
    provider: B,
    /// Location of the glTF document. Used when resolving relative URLs.
    base_uri: Url,
    buffers: Vec<Buffer>,
    data: ShardedLock<HashMap<usize, Arc<OnceCell<BufferBytes>>>>,
}

impl<B: BufferProvider> BufferCache<B> {
    /// Create an empty cache for `buffers`, fetching through `provider`.
    pub fn new(provider: B, base_uri: Url, buffers: Vec<Buffer>) -> Self {
        Self {
            provider,
            base_uri,
            buffers,
            data: ShardedLock::default(),
        }
    }

    /// Location relative buffer URIs are resolved against.
    #[inline]
    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Number of buffers whose bytes are currently held.
    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    /// Whether no buffer has been fetched yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bytes of buffer `index` are held.
    pub fn is_cached(&self, index: usize) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&index)
            .is_some_and(|cell| cell.initialized())
    }

    /// Get the bytes of the buffer at `index`, fetching them if they aren't already cached.
    #[tracing::instrument(skip(self), fields(base_url = self.base_uri.as_str()))]
    pub async fn get(&self, index: usize) -> Result<BufferBytes, Error> {
        if self.buffers.is_empty() {
            return Err(Error::MissingBuffers);
        }
        let buffer = self
            .buffers
            .get(index)
            .ok_or(Error::not_found(EntityKind::Buffer, index))?;

        let cell = self.cell(index);
        if let Some(data) = cell.get() {
            tracing::trace!("already loaded glTF buffer");
            return Ok(data.clone());
        }
        let data = cell.get_or_try_init(|| self.fetch(index, buffer)).await?;
        Ok(data.clone())
    }

    fn cell(&self, index: usize) -> Arc<OnceCell<BufferBytes>> {
        if let Some(cell) = self
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&index)
        {
            return cell.clone();
        }
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(index)
            .or_default()
            .clone()
    }

    async fn fetch(&self, index: usize, buffer: &Buffer) -> Result<BufferBytes, Error> {
        let uri = buffer
            .uri
            .as_deref()
            .ok_or(Error::EmbeddedBufferUnsupported(index))?;
        let url = self.base_uri.join(uri)?;
        tracing::debug!(url = url.as_str(), "loading glTF buffer");
        let data = self.provider.load(&url).await.map_err(Error::Provider)?;
        if data.len() < buffer.byte_length {
            tracing::warn!(
                expected = buffer.byte_length,
                actual = data.len(),
                "glTF buffer is shorter than its declared length"
            );
        }
        Ok(Arc::new(data))
    }
}
