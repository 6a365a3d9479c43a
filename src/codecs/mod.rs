//! Per-family decoder handles behind one [`Decoding`] interface.
//!
//! A [`DecoderContext`](crate::DecoderContext) owns at most one handle per
//! [`CodecFamily`] and dispatches through [`Decoding`] once, by family, so the
//! probe and unpack paths never switch on the format themselves.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::capabilities::CodecCapabilities;
use crate::error::DecodeError;
use crate::format::CodecFamily;
use crate::layout::SampleLayout;
use crate::limits::ResourceLimits;
use crate::shape::ShapeDescriptor;

mod gif;
mod jpeg;
mod png;
mod wav;

pub use self::gif::GifHandle;
pub use self::jpeg::JpegHandle;
pub use self::png::PngHandle;
pub use self::wav::WavHandle;

/// Probe and decode interface shared by every decoder handle.
///
/// Handles keep whatever state makes a probe followed by a decode of the same
/// bytes cheaper (parsed headers, composited frames, an open audio stream).
/// State is keyed on the input, so a handle fed different bytes starts over.
pub trait Decoding {
    /// Family this handle decodes.
    fn family(&self) -> CodecFamily;

    /// Static capability descriptor, including the supported output layouts.
    fn capabilities(&self) -> &'static CodecCapabilities;

    /// Header-only probe.
    ///
    /// Fields that need a full parse (GIF frame count) are left at 0.
    fn probe_header(
        &mut self,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<ShapeDescriptor, DecodeError>;

    /// Complete shape, parsing as much of the stream as that takes.
    ///
    /// Default delegates to [`probe_header`](Decoding::probe_header); formats
    /// whose header lacks a field override this.
    fn probe_full(
        &mut self,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<ShapeDescriptor, DecodeError> {
        self.probe_header(data, limits)
    }

    /// Decode `data` into `out` using `layout`.
    ///
    /// `out` is exactly `shape.required_bytes()` long and `layout` was selected
    /// from `capabilities()`. The handle checks `shape` against the stream and
    /// fails with [`DecodeError::ShapeMismatch`] rather than writing a
    /// differently shaped result.
    fn decode_into(
        &mut self,
        data: &[u8],
        shape: &ShapeDescriptor,
        layout: SampleLayout,
        out: &mut [u8],
        limits: &ResourceLimits,
    ) -> Result<(), DecodeError>;

    /// Drop every cached stream and buffer. The handle stays usable.
    fn reset(&mut self);
}

/// Identity of an input blob, used to key cached per-input state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fingerprint {
    len: usize,
    hash: u64,
}

impl Fingerprint {
    pub(crate) fn of(data: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        Self {
            len: data.len(),
            hash: hasher.finish(),
        }
    }
}

/// Compare caller-supplied dimensions against what the stream declares.
pub(crate) fn check_extent(
    shape: &ShapeDescriptor,
    stream: &ShapeDescriptor,
    fields: &[&'static str],
) -> Result<(), DecodeError> {
    for &field in fields {
        let (expected, actual) = match field {
            "frame_count" => (stream.frame_count, shape.frame_count),
            "width" => (stream.width, shape.width),
            "height" => (stream.height, shape.height),
            "channel_count" => (stream.channel_count, shape.channel_count),
            _ => continue,
        };
        if expected != actual {
            return Err(DecodeError::ShapeMismatch {
                field,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Fields every pixel format must agree on.
pub(crate) const IMAGE_EXTENT: &[&str] = &["frame_count", "width", "height"];
