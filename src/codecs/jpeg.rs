//! JPEG via `jpeg-decoder`.
//!
//! Gray streams report 1 channel. Every color stream (YCbCr, RGB, CMYK,
//! YCCK) reports 3: CMYK and YCCK are converted to RGB on decode, so a
//! 4-channel request is an unsupported layout rather than raw ink values.

use std::borrow::Cow;

use ::jpeg_decoder::{Decoder, PixelFormat};

use super::{Decoding, Fingerprint, IMAGE_EXTENT, check_extent};
use crate::capabilities::CodecCapabilities;
use crate::error::DecodeError;
use crate::format::{CodecFamily, MediaFormat};
use crate::layout::{SampleLayout, convert_pixels};
use crate::limits::ResourceLimits;
use crate::shape::ShapeDescriptor;

static CAPS: CodecCapabilities = CodecCapabilities::new()
    .with_cheap_probe(true)
    .with_layouts(&[SampleLayout::Gray8, SampleLayout::Rgb8]);

#[derive(Clone, Copy, Debug)]
struct JpegHeader {
    width: usize,
    height: usize,
    pixel_format: PixelFormat,
}

impl JpegHeader {
    fn shape(&self) -> Result<ShapeDescriptor, DecodeError> {
        let channels = match self.pixel_format {
            PixelFormat::L8 => 1,
            PixelFormat::RGB24 | PixelFormat::CMYK32 => 3,
            // 16-bit lossless gray has no 1-byte rendition we would stand behind.
            PixelFormat::L16 => return Err(DecodeError::layout(MediaFormat::Jpeg, 2, 1)),
        };
        Ok(ShapeDescriptor::image(self.width, self.height, channels, 1))
    }
}

/// Cached JPEG header for the last probed input.
#[derive(Debug, Default)]
pub struct JpegHandle {
    header: Option<(Fingerprint, JpegHeader)>,
}

impl JpegHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn decoder<'a>(data: &'a [u8], limits: &ResourceLimits) -> Decoder<&'a [u8]> {
        let mut decoder = Decoder::new(data);
        if let Some(max) = limits.memory_budget() {
            decoder.set_max_decoding_buffer_size(max);
        }
        decoder
    }

    fn header(&mut self, data: &[u8], limits: &ResourceLimits) -> Result<JpegHeader, DecodeError> {
        let fingerprint = Fingerprint::of(data);
        if let Some((cached, header)) = self.header
            && cached == fingerprint
        {
            return Ok(header);
        }
        let mut decoder = Self::decoder(data, limits);
        decoder
            .read_info()
            .map_err(|e| DecodeError::header(MediaFormat::Jpeg, e))?;
        let info = decoder
            .info()
            .ok_or_else(|| DecodeError::header(MediaFormat::Jpeg, "no frame header"))?;
        let header = JpegHeader {
            width: usize::from(info.width),
            height: usize::from(info.height),
            pixel_format: info.pixel_format,
        };
        self.header = Some((fingerprint, header));
        Ok(header)
    }
}

impl Decoding for JpegHandle {
    fn family(&self) -> CodecFamily {
        CodecFamily::Jpeg
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

        let pixels = Self::decoder(data, limits)
            .decode()
            .map_err(|e| DecodeError::frame(0, e))?;
        let (native, source) = match header.pixel_format {
            PixelFormat::L8 => (Cow::Borrowed(&pixels[..]), SampleLayout::Gray8),
            PixelFormat::RGB24 => (Cow::Borrowed(&pixels[..]), SampleLayout::Rgb8),
            PixelFormat::CMYK32 => (Cow::Owned(cmyk_to_rgb(&pixels)), SampleLayout::Rgb8),
            PixelFormat::L16 => return Err(DecodeError::layout(MediaFormat::Jpeg, 2, 1)),
        };
        convert_pixels(&native, source, out, layout)
    }

    fn reset(&mut self) {
        self.header = None;
    }
}

/// `jpeg-decoder` emits CMYK already inverted (255 = no ink), so each RGB
/// channel is the product of its ink and black coverage.
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for px in cmyk.chunks_exact(4) {
        let k = u32::from(px[3]);
        for &ink in &px[..3] {
            rgb.push(((u32::from(ink) * k + 127) / 255) as u8);
        }
    }
    rgb
}
