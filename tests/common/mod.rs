//! In-memory providers shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use scenery::{
    document::Document,
    error::BoxError,
    provider::{BufferData, BufferProvider, DocumentProvider, ImageProvider, LoadedDocument},
};
use url::Url;

/// Serves documents & buffers from memory, counting buffer fetches.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    documents: HashMap<String, serde_json::Value>,
    buffers: Arc<HashMap<String, Vec<u8>>>,
    fetches: Arc<AtomicUsize>,
    failing_image: Option<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, uri: &str, json: serde_json::Value) -> Self {
        self.documents.insert(uri.to_owned(), json);
        self
    }

    pub fn with_buffer(mut self, uri: &str, data: Vec<u8>) -> Self {
        Arc::make_mut(&mut self.buffers).insert(uri.to_owned(), data);
        self
    }

    /// Make requests for image `index` fail.
    pub fn with_failing_image(mut self, index: usize) -> Self {
        self.failing_image = Some(index);
        self
    }

    /// Number of buffer fetches issued so far, across every loaded document.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DocumentProvider for MockProvider {
    type Buffers = MockBuffers;
    type Images = MockImages;

    async fn load(&self, uri: &Url) -> Result<LoadedDocument<MockBuffers, MockImages>, BoxError> {
        let json = self
            .documents
            .get(uri.as_str())
            .ok_or_else(|| format!("no such document: {uri}"))?;
        let document: Document = serde_json::from_value(json.clone())?;
        Ok(LoadedDocument {
            document,
            buffers: MockBuffers {
                buffers: self.buffers.clone(),
                fetches: self.fetches.clone(),
            },
            images: MockImages {
                failing: self.failing_image,
            },
            base_uri: uri.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MockBuffers {
    buffers: Arc<HashMap<String, Vec<u8>>>,
    fetches: Arc<AtomicUsize>,
}

impl BufferProvider for MockBuffers {
    async fn load(&self, uri: &Url) -> Result<BufferData, BoxError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // give concurrent callers a chance to interleave
        tokio::task::yield_now().await;
        self.buffers
            .get(uri.as_str())
            .cloned()
            .map(BufferData::from)
            .ok_or_else(|| format!("no such buffer: {uri}").into())
    }
}

/// Resolves every image to the index it was requested with, except for `failing`.
#[derive(Debug)]
pub struct MockImages {
    failing: Option<usize>,
}

impl ImageProvider for MockImages {
    type Image = usize;

    async fn image(&self, index: usize) -> Result<usize, BoxError> {
        if self.failing == Some(index) {
            return Err("image decode failed".into());
        }
        Ok(index)
    }
}

/// Little-endian bytes of `values`.
pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
