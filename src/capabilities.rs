//! Codec capability descriptors.
//!
//! Each codec returns a static [`CodecCapabilities`] describing its probe
//! cost and the output layouts it can produce. The unpacker consults it to
//! turn a shape request into a [`SampleLayout`] before any decoding starts.

use crate::error::DecodeError;
use crate::format::MediaFormat;
use crate::layout::SampleLayout;
use crate::shape::ShapeDescriptor;

/// Describes what a codec supports.
///
/// Returned by [`Decoding::capabilities()`](crate::codecs::Decoding::capabilities)
/// as a `&'static` reference. Getter methods keep fields private so new ones
/// can be added without breaking changes.
///
/// ```
/// use tenpack::{CodecCapabilities, SampleLayout};
///
/// static CAPS: CodecCapabilities = CodecCapabilities::new()
///     .with_cheap_probe(true)
///     .with_layouts(&[SampleLayout::Gray8, SampleLayout::Rgb8]);
///
/// assert!(CAPS.cheap_probe());
/// assert!(CAPS.supports(SampleLayout::Rgb8));
/// assert!(!CAPS.supports(SampleLayout::Rgba8));
/// ```
#[non_exhaustive]
#[derive(Debug)]
pub struct CodecCapabilities {
    cheap_probe: bool,
    layouts: &'static [SampleLayout],
}

impl Default for CodecCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecCapabilities {
    /// Capabilities with a full-scan probe and no output layouts.
    pub const fn new() -> Self {
        Self {
            cheap_probe: false,
            layouts: &[],
        }
    }

    /// Whether the header probe already yields the complete shape.
    ///
    /// When false, [`probe_shape`](crate::probe_shape) goes through
    /// [`Decoding::probe_full`](crate::codecs::Decoding::probe_full).
    pub const fn cheap_probe(&self) -> bool {
        self.cheap_probe
    }





    /// Output layouts the unpacker can write for this codec.
    pub const fn layouts(&self) -> &'static [SampleLayout] {
        self.layouts
    }

    pub const fn with_cheap_probe(mut self, v: bool) -> Self {
        self.cheap_probe = v;
        self
    }





    pub const fn with_layouts(mut self, layouts: &'static [SampleLayout]) -> Self {
        self.layouts = layouts;
        self
    }

    /// Whether `layout` is one of [`layouts()`](Self::layouts).
    pub fn supports(&self, layout: SampleLayout) -> bool {
        self.layouts.contains(&layout)
    }

    /// Pick the output layout for `shape`.
    ///
    /// Pixel formats select on `(bytes_per_scalar_element, channel_count)`,
    /// audio on `(bytes_per_scalar_element, is_signed)`. Anything the codec
    /// cannot write fails with [`DecodeError::UnsupportedLayout`].
    pub fn select_layout(
        &self,
        format: MediaFormat,
        shape: &ShapeDescriptor,
    ) -> Result<SampleLayout, DecodeError> {
        let bytes = shape.bytes_per_scalar_element;
        let channels = shape.channel_count;
        let candidate = if format.is_audio() {
            SampleLayout::for_pcm(bytes, shape.is_signed)
        } else {
            SampleLayout::for_pixels(bytes, channels)
        };
        candidate
            .filter(|layout| self.supports(*layout))
            .ok_or_else(|| DecodeError::layout(format, bytes, channels))
    }
}
