mod common;

use common::{f32_bytes, u16_bytes, MockProvider};
use gltf::accessor::DataType;
use quickcheck_macros::quickcheck;
use scenery::{
    accessor,
    document::BufferView,
    error::EntityKind,
    ComponentMapping, Error, ResolverConfig, SceneResolver, TypedData,
};
use serde_json::json;

const DOC: &str = "https://example.com/models/triangle.gltf";
const BIN: &str = "https://example.com/models/triangle.bin";

#[tokio::test]
async fn three_floats() {
    let provider = MockProvider::new()
        .with_document(
            DOC,
            json!({
                "buffers": [ { "byteLength": 12, "uri": "triangle.bin" } ],
                "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 12 } ],
                "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 3 } ]
            }),
        )
        .with_buffer(BIN, f32_bytes(&[1.0, 2.0, 3.0]));
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();

    let slice = resolver.data(0).await.unwrap();
    assert_eq!(slice.data, TypedData::F32(vec![1.0, 2.0, 3.0]));
    assert_eq!(slice.offset, None);
    assert_eq!(slice.stride, None);
}

fn shared_buffer_doc() -> serde_json::Value {
    json!({
        "buffers": [ { "byteLength": 20, "uri": "triangle.bin" } ],
        "bufferViews": [
            { "buffer": 0, "byteLength": 12 },
            { "buffer": 0, "byteOffset": 12, "byteLength": 8, "byteStride": 4 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "SCALAR" },
            { "bufferView": 1, "byteOffset": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    })
}

fn shared_buffer_bytes() -> Vec<u8> {
    let mut bytes = f32_bytes(&[1.0, 2.0, 3.0]);
    bytes.extend(u16_bytes(&[7, 8, 9, 10]));
    bytes
}

#[tokio::test]
async fn shared_buffer_is_fetched_once() {
    let provider = MockProvider::new()
        .with_document(DOC, shared_buffer_doc())
        .with_buffer(BIN, shared_buffer_bytes());
    let mut resolver = SceneResolver::new(provider.clone());
    resolver.load(DOC).await.unwrap();

    let a = resolver.data(0).await.unwrap();
    let b = resolver.data(1).await.unwrap();
    assert_eq!(provider.fetches(), 1);
    assert!(resolver.buffers().unwrap().is_cached(0));

    assert_eq!(a.data, TypedData::F32(vec![1.0, 2.0, 3.0]));
    assert_eq!(b.data, TypedData::U16(vec![7, 8, 9, 10]));
    assert_eq!(b.offset, Some(2));
    assert_eq!(b.stride, Some(4));

    // repeated requests build fresh, equivalent views without refetching
    assert_eq!(resolver.data(0).await.unwrap(), a);
    assert_eq!(provider.fetches(), 1);
}

#[tokio::test]
async fn concurrent_first_requests_share_one_fetch() {
    let provider = MockProvider::new()
        .with_document(DOC, shared_buffer_doc())
        .with_buffer(BIN, shared_buffer_bytes());
    let mut resolver = SceneResolver::new(provider.clone());
    resolver.load(DOC).await.unwrap();

    let (a, b, c) = tokio::join!(resolver.data(0), resolver.data(1), resolver.data(0));
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(provider.fetches(), 1);
}

#[tokio::test]
async fn reload_discards_cache() {
    let provider = MockProvider::new()
        .with_document(DOC, shared_buffer_doc())
        .with_buffer(BIN, shared_buffer_bytes());
    let mut resolver = SceneResolver::new(provider.clone());
    resolver.load(DOC).await.unwrap();
    resolver.data(0).await.unwrap();
    resolver.load(DOC).await.unwrap();
    assert!(resolver.buffers().unwrap().is_empty());
    resolver.data(0).await.unwrap();
    assert_eq!(provider.fetches(), 2);
}

#[tokio::test]
async fn failed_fetch_is_retried() {
    let provider = MockProvider::new().with_document(DOC, shared_buffer_doc());
    let mut resolver = SceneResolver::new(provider.clone());
    resolver.load(DOC).await.unwrap();
    assert!(matches!(resolver.data(0).await, Err(Error::Provider(_))));
    assert!(matches!(resolver.data(0).await, Err(Error::Provider(_))));
    assert_eq!(provider.fetches(), 2);
    assert!(!resolver.buffers().unwrap().is_cached(0));
}

#[tokio::test]
async fn missing_buffers() {
    let provider = MockProvider::new().with_document(
        DOC,
        json!({
            "bufferViews": [ { "buffer": 0, "byteLength": 12 } ],
            "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 3 } ]
        }),
    );
    let mut resolver = SceneResolver::new(provider.clone());
    resolver.load(DOC).await.unwrap();
    assert!(matches!(resolver.data(0).await, Err(Error::MissingBuffers)));
    assert!(matches!(resolver.data(5).await, Err(Error::MissingBuffers)));
    assert_eq!(provider.fetches(), 0);
}

#[tokio::test]
async fn out_of_range_indices() {
    let provider = MockProvider::new()
        .with_document(
            DOC,
            json!({
                "buffers": [ { "byteLength": 20, "uri": "triangle.bin" } ],
                "bufferViews": [ { "buffer": 3, "byteLength": 12 } ],
                "accessors": [
                    { "bufferView": 0, "componentType": 5126, "count": 3 },
                    { "bufferView": 9, "componentType": 5126, "count": 3 }
                ]
            }),
        )
        .with_buffer(BIN, shared_buffer_bytes());
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();

    assert!(matches!(
        resolver.data(2).await,
        Err(Error::NotFound {
            kind: EntityKind::Accessor,
            index: 2
        })
    ));
    assert!(matches!(
        resolver.data(1).await,
        Err(Error::NotFound {
            kind: EntityKind::BufferView,
            index: 9
        })
    ));
    assert!(matches!(
        resolver.data(0).await,
        Err(Error::NotFound {
            kind: EntityKind::Buffer,
            index: 3
        })
    ));
}

#[tokio::test]
async fn buffer_view_defaults_to_zero() {
    let provider = MockProvider::new()
        .with_document(
            DOC,
            json!({
                "buffers": [ { "byteLength": 12, "uri": "triangle.bin" } ],
                "bufferViews": [ { "buffer": 0, "byteLength": 12 } ],
                "accessors": [ { "componentType": 5126, "count": 3 } ]
            }),
        )
        .with_buffer(BIN, f32_bytes(&[4.0, 5.0, 6.0]));
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();
    assert_eq!(
        resolver.data(0).await.unwrap().data,
        TypedData::F32(vec![4.0, 5.0, 6.0])
    );
}

#[tokio::test]
async fn embedded_buffers_are_unsupported() {
    let provider = MockProvider::new().with_document(
        DOC,
        json!({
            "buffers": [ { "byteLength": 12 } ],
            "bufferViews": [ { "buffer": 0, "byteLength": 12 } ],
            "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 3 } ]
        }),
    );
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();
    assert!(matches!(
        resolver.data(0).await,
        Err(Error::EmbeddedBufferUnsupported(0))
    ));
}

#[tokio::test]
async fn view_past_end_of_buffer() {
    let provider = MockProvider::new()
        .with_document(
            DOC,
            json!({
                "buffers": [ { "byteLength": 12, "uri": "triangle.bin" } ],
                "bufferViews": [ { "buffer": 0, "byteOffset": 8, "byteLength": 8 } ],
                "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 2 } ]
            }),
        )
        .with_buffer(BIN, f32_bytes(&[1.0, 2.0, 3.0]));
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();
    assert!(matches!(
        resolver.data(0).await,
        Err(Error::ViewOutOfRange {
            view: 0,
            start: 8,
            end: 16,
            len: 12
        })
    ));
}

fn mixed_doc() -> serde_json::Value {
    json!({
        "buffers": [ { "byteLength": 8, "uri": "triangle.bin" } ],
        "bufferViews": [ { "buffer": 0, "byteLength": 8 } ],
        "accessors": [
            { "componentType": 5120, "count": 8 },
            { "componentType": 5121, "count": 8 },
            { "componentType": 5122, "count": 4 },
            { "componentType": 5123, "count": 4 },
            { "componentType": 5125, "count": 2 },
            { "componentType": 5126, "count": 2 },
            { "componentType": 1234, "count": 8 }
        ]
    })
}

async fn decode_all(mapping: ComponentMapping) -> Vec<DataType> {
    let provider = MockProvider::new()
        .with_document(DOC, mixed_doc())
        .with_buffer(BIN, vec![0xff; 8]);
    let mut resolver = SceneResolver::with_config(
        provider,
        ResolverConfig::default().with_component_mapping(mapping),
    );
    resolver.load(DOC).await.unwrap();
    let mut res = Vec::new();
    for i in 0..7 {
        res.push(resolver.data(i).await.unwrap().data.data_type());
    }
    res
}

#[tokio::test]
async fn full_component_mapping() {
    assert_eq!(
        decode_all(ComponentMapping::Full).await,
        [
            DataType::I8,
            DataType::U8,
            DataType::I16,
            DataType::U16,
            DataType::U32,
            DataType::F32,
            DataType::U8
        ]
    );
}

#[tokio::test]
async fn legacy_component_mapping() {
    assert_eq!(
        decode_all(ComponentMapping::Legacy).await,
        [
            DataType::U8,
            DataType::U8,
            DataType::U8,
            DataType::U16,
            DataType::U8,
            DataType::F32,
            DataType::U8
        ]
    );
}

#[tokio::test]
async fn signed_values_survive_full_mapping() {
    let provider = MockProvider::new()
        .with_document(DOC, mixed_doc())
        .with_buffer(BIN, vec![0xff; 8]);
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();
    assert_eq!(
        resolver.data(2).await.unwrap().data,
        TypedData::I16(vec![-1; 4])
    );
    assert_eq!(
        resolver.data(4).await.unwrap().data,
        TypedData::U32(vec![u32::MAX; 2])
    );
}

#[tokio::test]
async fn sparse_accessors_decode_dense() {
    let provider = MockProvider::new()
        .with_document(
            DOC,
            json!({
                "buffers": [ { "byteLength": 12, "uri": "triangle.bin" } ],
                "bufferViews": [ { "buffer": 0, "byteLength": 12 } ],
                "accessors": [ {
                    "bufferView": 0, "componentType": 5126, "count": 3,
                    "sparse": { "count": 1, "indices": {}, "values": {} }
                } ]
            }),
        )
        .with_buffer(BIN, f32_bytes(&[1.0, 2.0, 3.0]));
    let mut resolver = SceneResolver::new(provider);
    resolver.load(DOC).await.unwrap();
    assert_eq!(
        resolver.data(0).await.unwrap().data,
        TypedData::F32(vec![1.0, 2.0, 3.0])
    );
}

fn view(len: usize) -> BufferView {
    BufferView {
        buffer: 0,
        byte_offset: None,
        byte_length: len,
        byte_stride: None,
        target: None,
        name: None,
    }
}

#[quickcheck]
fn u16_view_has_half_as_many_elements(halves: Vec<u16>) -> bool {
    let bytes = u16_bytes(&halves);
    accessor::decode(&bytes, 0, &view(bytes.len()), DataType::U16)
        .is_ok_and(|data| data.len() == bytes.len() / 2)
}

#[quickcheck]
fn f32_view_has_quarter_as_many_elements(words: Vec<u32>) -> bool {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    accessor::decode(&bytes, 0, &view(bytes.len()), DataType::F32)
        .is_ok_and(|data| data.len() == bytes.len() / 4)
}

#[test]
fn misaligned_view() {
    assert!(matches!(
        accessor::decode(&[0; 6], 3, &view(6), DataType::F32),
        Err(Error::MisalignedView {
            view: 3,
            len: 6,
            element_size: 4
        })
    ));
}
