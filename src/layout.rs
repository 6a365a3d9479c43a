//! Output sample layouts and the pixel conversions between them.
//!
//! A layout is picked from `(bytes_per_scalar_element, channel_count)` (or
//! signedness for PCM). The only pixel conversions are channel-count changes
//! (gray and RGB via BT.601 luma, adding or dropping alpha) and 8/16-bit
//! widening or narrowing. Codecs hand over their native rows and
//! [`convert_pixels`] writes the requested layout.

use crate::error::DecodeError;

/// Memory layout of decoded scalars.
///
/// Pixel layouts are interleaved per pixel; 16-bit layouts are written in
/// native byte order. PCM layouts are interleaved per PCM frame and have no
/// fixed channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleLayout {
    Gray8,
    GrayAlpha8,
    Rgb8,
    Rgba8,
    Gray16,
    GrayAlpha16,
    Rgb16,
    Rgba16,
    /// Unsigned 8-bit PCM, silence at 128.
    PcmU8,
    /// Signed 16-bit PCM.
    PcmS16,
    /// Signed 32-bit PCM. 24-bit streams are left-justified into it.
    PcmS32,
}

impl SampleLayout {
    /// Channels per pixel, `None` for PCM.
    pub const fn pixel_channels(self) -> Option<usize> {
        match self {
            SampleLayout::Gray8 | SampleLayout::Gray16 => Some(1),
            SampleLayout::GrayAlpha8 | SampleLayout::GrayAlpha16 => Some(2),
            SampleLayout::Rgb8 | SampleLayout::Rgb16 => Some(3),
            SampleLayout::Rgba8 | SampleLayout::Rgba16 => Some(4),
            SampleLayout::PcmU8 | SampleLayout::PcmS16 | SampleLayout::PcmS32 => None,
        }
    }

    /// Width of one scalar in bytes.
    pub const fn bytes_per_scalar(self) -> usize {
        match self {
            SampleLayout::Gray8
            | SampleLayout::GrayAlpha8
            | SampleLayout::Rgb8
            | SampleLayout::Rgba8
            | SampleLayout::PcmU8 => 1,
            SampleLayout::Gray16
            | SampleLayout::GrayAlpha16
            | SampleLayout::Rgb16
            | SampleLayout::Rgba16
            | SampleLayout::PcmS16 => 2,
            SampleLayout::PcmS32 => 4,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, SampleLayout::PcmS16 | SampleLayout::PcmS32)
    }

    pub const fn is_pcm(self) -> bool {
        self.pixel_channels().is_none()
    }

    /// Pixel layout for `(bytes, channels)`, if one exists.
    pub fn for_pixels(bytes: usize, channels: usize) -> Option<Self> {
        match (bytes, channels) {
            (1, 1) => Some(SampleLayout::Gray8),
            (1, 2) => Some(SampleLayout::GrayAlpha8),
            (1, 3) => Some(SampleLayout::Rgb8),
            (1, 4) => Some(SampleLayout::Rgba8),
            (2, 1) => Some(SampleLayout::Gray16),
            (2, 2) => Some(SampleLayout::GrayAlpha16),
            (2, 3) => Some(SampleLayout::Rgb16),
            (2, 4) => Some(SampleLayout::Rgba16),
            _ => None,
        }
    }

    /// PCM layout for `(bytes, signed)`, if one exists.
    pub fn for_pcm(bytes: usize, is_signed: bool) -> Option<Self> {
        match (bytes, is_signed) {
            (1, false) => Some(SampleLayout::PcmU8),
            (2, true) => Some(SampleLayout::PcmS16),
            (4, true) => Some(SampleLayout::PcmS32),
            _ => None,
        }
    }
}

/// Convert packed pixels from one layout to another.
///
/// 16-bit source samples are big-endian (PNG stream order); 16-bit output is
/// native-endian. `dst` must hold exactly as many pixels as `src`.
pub(crate) fn convert_pixels(
    src: &[u8],
    from: SampleLayout,
    dst: &mut [u8],
    to: SampleLayout,
) -> Result<(), DecodeError> {
    let (Some(src_channels), Some(dst_channels)) = (from.pixel_channels(), to.pixel_channels())
    else {
        return Err(DecodeError::InvalidShape("PCM layouts carry no pixels"));
    };
    let src_bytes = from.bytes_per_scalar();
    let dst_bytes = to.bytes_per_scalar();
    let src_pixel = src_channels * src_bytes;
    let dst_pixel = dst_channels * dst_bytes;
    let pixels = src.len() / src_pixel;
    if src.len() % src_pixel != 0 || dst.len() != pixels * dst_pixel {
        return Err(DecodeError::ShapeMismatch {
            field: "decoded bytes",
            expected: pixels * dst_pixel,
            actual: dst.len(),
        });
    }

    if from == to && src_bytes == 1 {
        dst.copy_from_slice(src);
        return Ok(());
    }

    for (src_px, dst_px) in src
        .chunks_exact(src_pixel)
        .zip(dst.chunks_exact_mut(dst_pixel))
    {
        let rgba = read_pixel(src_px, src_channels, src_bytes);
        write_pixel(dst_px, dst_channels, dst_bytes, rgba);
    }
    Ok(())
}

/// Widen one pixel to 16-bit RGBA. 8-bit values scale by 257 so that
/// `>> 8` restores them exactly.
fn read_pixel(px: &[u8], channels: usize, bytes: usize) -> [u16; 4] {
    let sample = |i: usize| {
        if bytes == 1 {
            u16::from(px[i]) * 257
        } else {
            u16::from_be_bytes([px[2 * i], px[2 * i + 1]])
        }
    };
    match channels {
        1 => {
            let g = sample(0);
            [g, g, g, u16::MAX]
        }
        2 => {
            let g = sample(0);
            [g, g, g, sample(1)]
        }
        3 => [sample(0), sample(1), sample(2), u16::MAX],
        _ => [sample(0), sample(1), sample(2), sample(3)],
    }
}

/// BT.601 luma, rounded. Exact for gray inputs (r == g == b).
fn luma(r: u16, g: u16, b: u16) -> u16 {
    let y = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000;
    y as u16
}

fn write_pixel(px: &mut [u8], channels: usize, bytes: usize, [r, g, b, a]: [u16; 4]) {
    let values = match channels {
        1 => [luma(r, g, b), 0, 0, 0],
        2 => [luma(r, g, b), a, 0, 0],
        3 => [r, g, b, 0],
        _ => [r, g, b, a],
    };
    for (i, value) in values[..channels].iter().enumerate() {
        if bytes == 1 {
            px[i] = (value >> 8) as u8;
        } else {
            px[2 * i..2 * i + 2].copy_from_slice(&value.to_ne_bytes());
        }
    }
}
