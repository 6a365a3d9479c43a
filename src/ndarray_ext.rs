//! `ndarray` views of decoded tensors.
//!
//! Enable with the `ndarray` feature flag.

use ndarray::{ArrayD, IxDyn};

use crate::error::DecodeError;
use crate::tensor::{ElementType, TensorSpec};
use crate::unpack::Unpacked;

/// Owned n-dimensional array of whichever element type a tensor decoded to.
#[derive(Clone, Debug, PartialEq)]
pub enum TensorArray {
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    U64(ArrayD<u64>),
    I64(ArrayD<i64>),
}

/// Scalar types a [`TensorArray`] can hold.
pub trait ArrayType: Sized + Copy + 'static {
    const ELEMENT_TYPE: ElementType;

    fn from_ne_slice(bytes: &[u8]) -> Self;
    fn wrap(array: ArrayD<Self>) -> TensorArray;
    fn unwrap(array: TensorArray) -> Option<ArrayD<Self>>;
}

macro_rules! array_type {
    ($ty:ty, $variant:ident) => {
        impl ArrayType for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            fn from_ne_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(raw)
            }

            fn wrap(array: ArrayD<Self>) -> TensorArray {
                TensorArray::$variant(array)
            }

            fn unwrap(array: TensorArray) -> Option<ArrayD<Self>> {
                match array {
                    TensorArray::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }
    };
}

array_type!(u8, U8);
array_type!(i8, I8);
array_type!(u16, U16);
array_type!(i16, I16);
array_type!(u32, U32);
array_type!(i32, I32);
array_type!(u64, U64);
array_type!(i64, I64);

fn typed<T: ArrayType>(spec: &TensorSpec, bytes: &[u8]) -> Result<TensorArray, DecodeError> {
    let values: Vec<T> = bytes
        .chunks_exact(size_of::<T>())
        .map(T::from_ne_slice)
        .collect();
    let array = ArrayD::from_shape_vec(IxDyn(&spec.dims), values).map_err(|_| {
        DecodeError::ShapeMismatch {
            field: "dims",
            expected: spec.len(),
            actual: bytes.len() / size_of::<T>(),
        }
    })?;
    Ok(T::wrap(array))
}

impl TensorArray {
    /// Copy native-endian `bytes` into an array shaped by `spec`.
    pub fn from_bytes(spec: &TensorSpec, bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != spec.byte_len() {
            return Err(DecodeError::ShapeMismatch {
                field: "byte length",
                expected: spec.byte_len(),
                actual: bytes.len(),
            });
        }
        match spec.element_type {
            ElementType::U8 => typed::<u8>(spec, bytes),
            ElementType::I8 => typed::<i8>(spec, bytes),
            ElementType::U16 => typed::<u16>(spec, bytes),
            ElementType::I16 => typed::<i16>(spec, bytes),
            ElementType::U32 => typed::<u32>(spec, bytes),
            ElementType::I32 => typed::<i32>(spec, bytes),
            ElementType::U64 => typed::<u64>(spec, bytes),
            ElementType::I64 => typed::<i64>(spec, bytes),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            TensorArray::U8(_) => ElementType::U8,
            TensorArray::I8(_) => ElementType::I8,
            TensorArray::U16(_) => ElementType::U16,
            TensorArray::I16(_) => ElementType::I16,
            TensorArray::U32(_) => ElementType::U32,
            TensorArray::I32(_) => ElementType::I32,
            TensorArray::U64(_) => ElementType::U64,
            TensorArray::I64(_) => ElementType::I64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            TensorArray::U8(a) => a.shape(),
            TensorArray::I8(a) => a.shape(),
            TensorArray::U16(a) => a.shape(),
            TensorArray::I16(a) => a.shape(),
            TensorArray::U32(a) => a.shape(),
            TensorArray::I32(a) => a.shape(),
            TensorArray::U64(a) => a.shape(),
            TensorArray::I64(a) => a.shape(),
        }
    }

    /// The array as `ArrayD<T>`, or `None` if it holds another element type.
    pub fn into_array<T: ArrayType>(self) -> Option<ArrayD<T>> {
        T::unwrap(self)
    }
}

impl Unpacked {
    /// Typed array of the decoded data.
    pub fn to_ndarray(&self) -> Result<TensorArray, DecodeError> {
        TensorArray::from_bytes(&self.tensor, &self.data)
    }

    /// Typed `ArrayD<T>`; fails if `T` is not the decoded element type.
    pub fn to_array<T: ArrayType>(&self) -> Result<ArrayD<T>, DecodeError> {
        if T::ELEMENT_TYPE != self.tensor.element_type {
            return Err(DecodeError::ShapeMismatch {
                field: "element size",
                expected: self.tensor.element_type.element_size(),
                actual: T::ELEMENT_TYPE.element_size(),
            });
        }
        let array = self.to_ndarray()?;
        T::unwrap(array).ok_or(DecodeError::InvalidShape("element type mismatch"))
    }
}
