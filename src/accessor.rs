//! Decoding of accessor data into typed views.
//!
//! The decoder produces the whole buffer view reinterpreted as elements of the accessor's component
//! type, together with the accessor's byte offset & the view's byte stride. It does not apply the
//! offset or stride itself; [DecodedSlice::element] is available to callers that want that done
//! for them.

use gltf::accessor::DataType;

use crate::{document::BufferView, error::Error};

/// Convenience macro for emitting [tracing] events about [Accessors](crate::document::Accessor).
macro_rules! trace_accessor {
    ($index:expr, $acc:expr, $msg:expr) => {
        tracing::trace!(
            index = $index,
            component_type = $acc.component_type.0,
            kind = $acc.kind.as_deref(),
            count = $acc.count,
            name = $acc.name.as_deref(),
            $msg
        );
    };
}
pub(crate) use trace_accessor;

/// The elements of a buffer view, decoded as a single component type.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum TypedData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl TypedData {
    /// Decode little-endian `bytes` as elements of `data_type`.
    ///
    /// Returns `None` if `bytes.len()` isn't a multiple of the element size.
    pub fn from_le_bytes(bytes: &[u8], data_type: DataType) -> Option<Self> {
        match data_type {
            DataType::I8 => read::<i8>(bytes),
            DataType::U8 => read::<u8>(bytes),
            DataType::I16 => read::<i16>(bytes),
            DataType::U16 => read::<u16>(bytes),
            DataType::U32 => read::<u32>(bytes),
            DataType::F32 => read::<f32>(bytes),
        }
    }

    /// The component type of the decoded elements.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::I8(_) => DataType::I8,
            Self::U8(_) => DataType::U8,
            Self::I16(_) => DataType::I16,
            Self::U16(_) => DataType::U16,
            Self::U32(_) => DataType::U32,
            Self::F32(_) => DataType::F32,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::I8(d) => d.len(),
            Self::U8(d) => d.len(),
            Self::I16(d) => d.len(),
            Self::U16(d) => d.len(),
            Self::U32(d) => d.len(),
            Self::F32(d) => d.len(),
        }
    }

    /// Whether there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the elements as `T`, if `T` is the decoded component type.
    #[inline]
    pub fn as_slice<T: BufferComponent>(&self) -> Option<&[T]> {
        T::unwrap(self)
    }

    /// Get the element at `index` converted to `f32`.
    pub fn get_f32(&self, index: usize) -> Option<f32> {
        match self {
            Self::I8(d) => d.get(index).map(|&v| v as f32),
            Self::U8(d) => d.get(index).map(|&v| v as f32),
            Self::I16(d) => d.get(index).map(|&v| v as f32),
            Self::U16(d) => d.get(index).map(|&v| v as f32),
            Self::U32(d) => d.get(index).map(|&v| v as f32),
            Self::F32(d) => d.get(index).copied(),
        }
    }
}

/// The result of decoding an accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSlice {
    /// Every element of the accessor's buffer view
    pub data: TypedData,
    /// Byte offset of the accessor's first element within `data`; `None` means zero
    pub offset: Option<usize>,
    /// Byte distance between consecutive elements; `None` means tightly packed
    pub stride: Option<usize>,
}

impl DecodedSlice {
    /// Fetch the `components` values of element `index`, applying `offset` & `stride`.
    ///
    /// Returns `None` if the element falls outside the view, or doesn't start on a component
    /// boundary.
    pub fn element(&self, index: usize, components: usize) -> Option<Vec<f32>> {
        let size = component_size(self.data.data_type());
        let stride = match self.stride {
            Some(stride) => stride,
            None => components.checked_mul(size)?,
        };
        let start = index
            .checked_mul(stride)?
            .checked_add(self.offset.unwrap_or(0))?;
        if start % size != 0 {
            return None;
        }
        let first = start / size;
        (first..first.checked_add(components)?)
            .map(|i| self.data.get_f32(i))
            .collect()
    }
}

/// Decode the bytes of the buffer view at `view_index` as elements of `data_type`.
///
/// `buffer` is the whole buffer the view belongs to.
pub fn decode(
    buffer: &[u8],
    view_index: usize,
    view: &BufferView,
    data_type: DataType,
) -> Result<TypedData, Error> {
    let range = view.range();
    let bytes = buffer
        .get(range.clone())
        .ok_or(Error::ViewOutOfRange {
            view: view_index,
            start: range.start,
            end: range.end,
            len: buffer.len(),
        })?;
    TypedData::from_le_bytes(bytes, data_type).ok_or(Error::MisalignedView {
        view: view_index,
        len: bytes.len(),
        element_size: component_size(data_type),
    })
}

/// Size in bytes of a single component of the given [DataType].
pub const fn component_size(comp: DataType) -> usize {
    use std::mem::size_of;
    match comp {
        DataType::I8 => size_of::<i8>(),
        DataType::U8 => size_of::<u8>(),
        DataType::I16 => size_of::<i16>(),
        DataType::U16 => size_of::<u16>(),
        DataType::U32 => size_of::<u32>(),
        DataType::F32 => size_of::<f32>(),
    }
}

fn read<T: BufferComponent>(bytes: &[u8]) -> Option<TypedData> {
    if bytes.len() % T::SIZE != 0 {
        return None;
    }
    Some(T::wrap(
        bytes.chunks_exact(T::SIZE).map(T::from_le_chunk).collect(),
    ))
}

/// Rust types which can hold a single glTF buffer component.
pub trait BufferComponent: Copy + Sized {
    /// The glTF component type this Rust type holds
    const TYPE: DataType;
    /// Size in bytes of one component
    const SIZE: usize = component_size(Self::TYPE);

    /// Read one component from exactly [Self::SIZE] little-endian bytes.
    fn from_le_chunk(chunk: &[u8]) -> Self;
    /// Wrap decoded components in the matching [TypedData] variant.
    fn wrap(data: Vec<Self>) -> TypedData;
    /// Borrow the components of `data`, if it holds this type.
    fn unwrap(data: &TypedData) -> Option<&[Self]>;
}

mod _impl_traits {
    use super::{component_size, BufferComponent, TypedData};
    use gltf::accessor::DataType;

    macro_rules! impl_bufcomponent {
        ($type:ty, $variant:ident) => {
            // "size of type $type == size of component $variant"
            static_assertions::const_assert_eq!(
                std::mem::size_of::<$type>(),
                component_size(DataType::$variant)
            );

            impl BufferComponent for $type {
                const TYPE: DataType = DataType::$variant;

                #[inline]
                fn from_le_chunk(chunk: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$type>()];
                    bytes.copy_from_slice(chunk);
                    <$type>::from_le_bytes(bytes)
                }

                #[inline]
                fn wrap(data: Vec<Self>) -> TypedData {
                    TypedData::$variant(data)
                }

                #[inline]
                fn unwrap(data: &TypedData) -> Option<&[Self]> {
                    match data {
                        TypedData::$variant(d) => Some(d),
                        _ => None,
                    }
                }
            }
        };
    }

    impl_bufcomponent!(i8, I8);
    impl_bufcomponent!(u8, U8);
    impl_bufcomponent!(i16, I16);
    impl_bufcomponent!(u16, U16);
    impl_bufcomponent!(u32, U32);
    impl_bufcomponent!(f32, F32);
}
