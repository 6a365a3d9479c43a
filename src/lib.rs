//! Turn image, animation and audio blobs into dense tensors.
//!
//! The pipeline has four steps, each usable on its own:
//!
//! - [`classify`] / [`MediaFormat::detect`]: signature sniffing
//! - [`probe_shape`]: header parse into a [`ShapeDescriptor`]
//! - [`tensor_spec`] / [`element_type`]: element type and dimensions for a shape
//! - [`decode_into`]: decode into a caller-owned buffer
//!
//! [`unpack`] runs all four and returns an owned [`Unpacked`].
//!
//! Probe and decode go through a [`DecoderContext`], which caches one decoder
//! handle per codec family so a probe and the decode that follows share parsed
//! state. The free functions take `&mut Option<DecoderContext>`, create the
//! context on first use and leave it with the caller; [`release`] drops it.
//! Use one context per thread.
//!
//! Decoding is delegated to `jpeg-decoder`, `png`, `gif` and `symphonia`.
//! BMP, ICO, JPEG 2000, JPEG XR, PSD, DWG, AVI and MPEG-4 are recognized but
//! not decoded.
//!
//! # Features
//!
//! - `ndarray`: [`TensorArray`] and typed `ArrayD` access on [`Unpacked`]
//! - `rayon`: [`unpack_many`] over a dedicated thread pool

#![forbid(unsafe_code)]

mod capabilities;
pub mod codecs;
mod context;
mod error;
mod format;
mod layout;
mod limits;
mod probe;
mod shape;
mod tensor;
mod unpack;

#[cfg(feature = "rayon")]
mod batch;
#[cfg(feature = "ndarray")]
mod ndarray_ext;
#[cfg(test)]
mod testdata;

pub use capabilities::CodecCapabilities;
pub use context::{DecoderContext, release};
pub use error::DecodeError;
pub use format::{CodecFamily, MediaFormat, MediaKind, classify};
pub use layout::SampleLayout;
pub use limits::{LimitExceeded, ResourceLimits};
pub use probe::probe_shape;
pub use shape::ShapeDescriptor;
pub use tensor::{ElementType, TensorSpec, element_type, tensor_spec};
pub use unpack::{Unpacked, decode_into, unpack, unpack_into};

#[cfg(feature = "rayon")]
pub use batch::{unpack_many, unpack_many_with_limits};
#[cfg(feature = "ndarray")]
pub use ndarray_ext::{ArrayType, TensorArray};
