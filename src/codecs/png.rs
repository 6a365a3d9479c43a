//! PNG via the `png` crate.
//!
//! Channel count follows the color type, with indexed images reporting one
//! channel. Decoding always expands palettes and sub-byte gray to 8 bits, then
//! converts to the requested layout, so an indexed image asked for as gray
//! yields the luma of its palette colors.

use ::png::{BitDepth, ColorType, Decoder, Limits, Transformations};

use super::{Decoding, Fingerprint, IMAGE_EXTENT, check_extent};
use crate::capabilities::CodecCapabilities;
use crate::error::DecodeError;
use crate::format::{CodecFamily, MediaFormat};
use crate::layout::{SampleLayout, convert_pixels};
use crate::limits::ResourceLimits;
use crate::shape::ShapeDescriptor;

static CAPS: CodecCapabilities = CodecCapabilities::new()
    .with_cheap_probe(true)
    .with_layouts(&[
        SampleLayout::Gray8,
        SampleLayout::GrayAlpha8,
        SampleLayout::Rgb8,
        SampleLayout::Rgba8,
        SampleLayout::Gray16,
        SampleLayout::GrayAlpha16,
        SampleLayout::Rgb16,
        SampleLayout::Rgba16,
    ]);

#[derive(Clone, Copy, Debug)]
struct PngHeader {
    width: usize,
    height: usize,
    color_type: ColorType,
    bit_depth: BitDepth,
}

impl PngHeader {
    fn shape(&self) -> Result<ShapeDescriptor, DecodeError> {
        let bits = self.bit_depth as u8;
        let channels = match self.color_type {
            ColorType::Grayscale | ColorType::Indexed => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        };
        if self.color_type == ColorType::Indexed && bits < 8 {
            return Err(DecodeError::layout(MediaFormat::Png, 1, channels));
        }
        // 1, 2 and 4-bit gray are scaled up to full 8-bit range on decode.
        let bytes = if bits == 16 { 2 } else { 1 };
        Ok(ShapeDescriptor::image(self.width, self.height, channels, bytes))
    }
}

/// Cached PNG header plus a row buffer reused across decodes.
#[derive(Debug, Default)]
pub struct PngHandle {
    header: Option<(Fingerprint, PngHeader)>,
    scratch: Vec<u8>,
}

impl PngHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn decoder<'a>(data: &'a [u8], limits: &ResourceLimits) -> Decoder<&'a [u8]> {
        let bytes = limits.memory_budget().unwrap_or(usize::MAX);
        Decoder::new_with_limits(data, Limits { bytes })
    }

    fn header(&mut self, data: &[u8], limits: &ResourceLimits) -> Result<PngHeader, DecodeError> {
        let fingerprint = Fingerprint::of(data);
        if let Some((cached, header)) = self.header
            && cached == fingerprint
        {
            return Ok(header);
        }
        let mut decoder = Self::decoder(data, limits);
        let info = decoder
            .read_header_info()
            .map_err(|e| DecodeError::header(MediaFormat::Png, e))?;
        let header = PngHeader {
            width: info.width as usize,
            height: info.height as usize,
            color_type: info.color_type,
            bit_depth: info.bit_depth,
        };
        self.header = Some((fingerprint, header));
        Ok(header)
    }
}

impl Decoding for PngHandle {
    fn family(&self) -> CodecFamily {
        CodecFamily::Png
    }

    fn capabilities(&self) -> &'static CodecCapabilities {
        &CAPS
    }

    fn probe_header(
        &mut self,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<ShapeDescriptor, DecodeError> {
        self.header(data, limits)?.shape()
    }

    fn decode_into(
        &mut self,
        data: &[u8],
        shape: &ShapeDescriptor,
        layout: SampleLayout,
        out: &mut [u8],
        limits: &ResourceLimits,
    ) -> Result<(), DecodeError> {
        let header = self.header(data, limits)?;
        check_extent(shape, &header.shape()?, IMAGE_EXTENT)?;

        let mut decoder = Self::decoder(data, limits);
        decoder.set_transformations(Transformations::EXPAND);
        let mut reader = decoder
            .read_info()
            .map_err(|e| DecodeError::header(MediaFormat::Png, e))?;
        self.scratch.clear();
        self.scratch.resize(reader.output_buffer_size(), 0);
        let frame = reader
            .next_frame(&mut self.scratch)
            .map_err(|e| DecodeError::frame(0, e))?;

        let (color, depth) = reader.output_color_type();
        let bytes = if depth == BitDepth::Sixteen { 2 } else { 1 };
        let source = SampleLayout::for_pixels(bytes, color.samples())
            .ok_or_else(|| DecodeError::layout(MediaFormat::Png, bytes, color.samples()))?;
        convert_pixels(&self.scratch[..frame.buffer_size()], source, out, layout)
    }

    fn reset(&mut self) {
        self.header = None;
        self.scratch = Vec::new();
    }
}
