//! GIF via the `gif` crate.
//!
//! Frames are composited onto a full-size RGBA canvas, honoring each frame's
//! disposal method, so every output frame is a complete picture. The channel
//! count is always 4. The frame count needs a full scan, which also produces
//! the composited frames; they are kept for the decode that usually follows.

use std::num::NonZeroU64;

use ::gif::{ColorOutput, DecodeOptions, DisposalMethod, Frame, MemoryLimit};

use super::{Decoding, Fingerprint, IMAGE_EXTENT, check_extent};
use crate::capabilities::CodecCapabilities;
use crate::error::DecodeError;
use crate::format::{CodecFamily, MediaFormat};
use crate::layout::{SampleLayout, convert_pixels};
use crate::limits::ResourceLimits;
use crate::shape::ShapeDescriptor;

static CAPS: CodecCapabilities = CodecCapabilities::new()
    .with_layouts(&[SampleLayout::Rgba8, SampleLayout::Rgb8]);

const CHANNELS: usize = 4;

/// Fully composited frames, frame-major RGBA.
#[derive(Debug)]
struct Animation {
    width: usize,
    height: usize,
    frame_count: usize,
    pixels: Vec<u8>,
}

impl Animation {
    fn shape(&self) -> ShapeDescriptor {
        ShapeDescriptor::animation(self.frame_count, self.width, self.height, CHANNELS, 1)
    }
}

/// Composited frames of the last fully probed input.
#[derive(Debug, Default)]
pub struct GifHandle {
    animation: Option<(Fingerprint, Animation)>,
}

impl GifHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn options(limits: &ResourceLimits) -> DecodeOptions {
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::RGBA);
        if let Some(max) = limits.max_memory_bytes.and_then(NonZeroU64::new) {
            options.set_memory_limit(MemoryLimit::Bytes(max));
        }
        options
    }

    fn composite(data: &[u8], limits: &ResourceLimits) -> Result<Animation, DecodeError> {
        let mut decoder = Self::options(limits)
            .read_info(data)
            .map_err(|e| DecodeError::header(MediaFormat::Gif, e))?;
        let width = usize::from(decoder.width());
        let height = usize::from(decoder.height());
        let frame_len = width * height * CHANNELS;

        let mut canvas = vec![0u8; frame_len];
        let mut pixels = Vec::new();
        let mut frame_count = 0;
        loop {
            let frame = match decoder.read_next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => return Err(DecodeError::frame(frame_count, e)),
            };
            limits.check_frames(frame_count as u64 + 1)?;
            limits.check_memory((pixels.len() + frame_len) as u64)?;

            let restore = (frame.dispose == DisposalMethod::Previous).then(|| canvas.clone());
            blit(&mut canvas, width, height, frame);
            pixels.extend_from_slice(&canvas);
            frame_count += 1;

            match frame.dispose {
                DisposalMethod::Background => clear(&mut canvas, width, height, frame),
                DisposalMethod::Previous => {
                    if let Some(previous) = restore {
                        canvas = previous;
                    }
                }
                DisposalMethod::Any | DisposalMethod::Keep => {}
            }
        }
        log::trace!("composited {frame_count} GIF frames of {width}x{height}");
        Ok(Animation {
            width,
            height,
            frame_count,
            pixels,
        })
    }

    fn animation(
        &mut self,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<&Animation, DecodeError> {
        let fingerprint = Fingerprint::of(data);
        let stale = !matches!(&self.animation, Some((cached, _)) if *cached == fingerprint);
        if stale {
            let animation = Self::composite(data, limits)?;
            self.animation = Some((fingerprint, animation));
        }
        match &self.animation {
            Some((_, animation)) => Ok(animation),
            None => Err(DecodeError::header(MediaFormat::Gif, "no frames decoded")),
        }
    }
}

/// Clip `frame` to the canvas and paint its opaque pixels.
fn blit(canvas: &mut [u8], width: usize, height: usize, frame: &Frame<'_>) {
    let (left, top) = (usize::from(frame.left), usize::from(frame.top));
    let frame_width = usize::from(frame.width);
    if frame_width == 0 {
        return;
    }
    for (row, src) in frame.buffer.chunks_exact(frame_width * CHANNELS).enumerate() {
        let y = top + row;
        if y >= height {
            break;
        }
        for (col, px) in src.chunks_exact(CHANNELS).enumerate() {
            let x = left + col;
            if x >= width {
                break;
            }
            if px[3] == 0 {
                continue;
            }
            let at = (y * width + x) * CHANNELS;
            canvas[at..at + CHANNELS].copy_from_slice(px);
        }
    }
}

/// Restore the frame's rectangle to transparent background.
fn clear(canvas: &mut [u8], width: usize, height: usize, frame: &Frame<'_>) {
    let (left, top) = (usize::from(frame.left), usize::from(frame.top));
    let right = (left + usize::from(frame.width)).min(width);
    let bottom = (top + usize::from(frame.height)).min(height);
    for y in top..bottom {
        if left < right {
            canvas[(y * width + left) * CHANNELS..(y * width + right) * CHANNELS].fill(0);
        }
    }
}

impl Decoding for GifHandle {
    fn family(&self) -> CodecFamily {
        CodecFamily::Gif
    }

    fn capabilities(&self) -> &'static CodecCapabilities {
        &CAPS
    }

    /// Logical screen size only; `frame_count` stays 0.
    fn probe_header(
        &mut self,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<ShapeDescriptor, DecodeError> {
        let decoder = Self::options(limits)
            .read_info(data)
            .map_err(|e| DecodeError::header(MediaFormat::Gif, e))?;
        Ok(ShapeDescriptor::animation(
            0,
            usize::from(decoder.width()),
            usize::from(decoder.height()),
            CHANNELS,
            1,
        ))
    }

    fn probe_full(
        &mut self,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<ShapeDescriptor, DecodeError> {
        Ok(self.animation(data, limits)?.shape())
    }

    fn decode_into(
        &mut self,
        data: &[u8],
        shape: &ShapeDescriptor,
        layout: SampleLayout,
        out: &mut [u8],
        limits: &ResourceLimits,
    ) -> Result<(), DecodeError> {
        let animation = self.animation(data, limits)?;
        check_extent(shape, &animation.shape(), IMAGE_EXTENT)?;
        convert_pixels(&animation.pixels, SampleLayout::Rgba8, out, layout)?;
        // Composited frames are the largest thing a context holds.
        self.animation = None;
        Ok(())
    }

    fn reset(&mut self) {
        self.animation = None;
    }
}
