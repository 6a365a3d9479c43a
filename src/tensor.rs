//! Element types and tensor shapes for decoded content.
//!
//! [`element_type`] is the single place where a shape's scalar encoding turns
//! into a typed element. [`tensor_spec`] adds the per-format dimension order.

use core::fmt;

use crate::error::DecodeError;
use crate::format::{MediaFormat, MediaKind};
use crate::shape::ShapeDescriptor;

/// Scalar type of a decoded tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl ElementType {
    /// Size in bytes of a single element.
    pub fn element_size(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 => 4,
            ElementType::U64 | ElementType::I64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ElementType::I8 | ElementType::I16 | ElementType::I32 | ElementType::I64
        )
    }

    /// Integer type of the given width and signedness.
    pub fn from_width(bytes: usize, is_signed: bool) -> Option<Self> {
        match (bytes, is_signed) {
            (1, false) => Some(ElementType::U8),
            (1, true) => Some(ElementType::I8),
            (2, false) => Some(ElementType::U16),
            (2, true) => Some(ElementType::I16),
            (4, false) => Some(ElementType::U32),
            (4, true) => Some(ElementType::I32),
            (8, false) => Some(ElementType::U64),
            (8, true) => Some(ElementType::I64),
            _ => None,
        }
    }

    /// NumPy-style dtype name.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::U8 => "uint8",
            ElementType::I8 => "int8",
            ElementType::U16 => "uint16",
            ElementType::I16 => "int16",
            ElementType::U32 => "uint32",
            ElementType::I32 => "int32",
            ElementType::U64 => "uint64",
            ElementType::I64 => "int64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type for a format's decoded scalars.
///
/// Pixel formats are always unsigned whatever `is_signed` says; audio honors
/// it, so unsigned 8-bit WAV stays `U8`.
pub fn element_type(
    format: MediaFormat,
    bytes_per_scalar_element: usize,
    channel_count: usize,
    is_signed: bool,
) -> Result<ElementType, DecodeError> {
    match format {
        MediaFormat::Unknown => return Err(DecodeError::UnrecognizedFormat),
        format if !format.is_supported() => {
            return Err(DecodeError::RecognizedUnsupportedFormat(format));
        }
        _ => {}
    }
    if channel_count == 0 {
        return Err(DecodeError::InvalidShape("channel_count must be at least 1"));
    }
    let signed = format.is_audio() && is_signed;
    ElementType::from_width(bytes_per_scalar_element, signed).ok_or(DecodeError::InvalidShape(
        "bytes_per_scalar_element must be 1, 2, 4 or 8",
    ))
}

/// Element type and dimensions of a decoded tensor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TensorSpec {
    pub element_type: ElementType,
    /// Image `[h, w, c]`, animation `[f, h, w, c]`, audio `[samples]`.
    pub dims: Vec<usize>,
}

impl TensorSpec {
    /// Number of scalars.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the backing buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_type.element_size()
    }

    /// Allocate a zeroed buffer of [`byte_len()`](Self::byte_len) bytes.
    pub fn zeroed(&self) -> Vec<u8> {
        vec![0; self.byte_len()]
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.element_type, self.dims)
    }
}

/// Tensor layout for decoding `format` with `shape`.
pub fn tensor_spec(
    format: MediaFormat,
    shape: &ShapeDescriptor,
) -> Result<TensorSpec, DecodeError> {
    shape.validate()?;
    let element_type = element_type(
        format,
        shape.bytes_per_scalar_element,
        shape.channel_count,
        shape.is_signed,
    )?;
    // Overflow check for the dims product below.
    shape.required_bytes(format)?;
    let dims = match format.kind() {
        Some(MediaKind::Audio) => vec![shape.width],
        Some(MediaKind::Animation) => vec![
            shape.frame_count,
            shape.height,
            shape.width,
            shape.channel_count,
        ],
        _ => vec![shape.height, shape.width, shape.channel_count],
    };
    Ok(TensorSpec { element_type, dims })
}
