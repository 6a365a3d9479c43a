//! Shape descriptor: dimensions and element encoding of decoded content.

use crate::error::DecodeError;
use crate::format::MediaFormat;

/// Dimensions and scalar encoding of one decoded blob.
///
/// Field meaning depends on the format:
///
/// | Format    | `frame_count` | `width`                      | `height`          | `channel_count` |
/// |-----------|---------------|------------------------------|-------------------|-----------------|
/// | JPEG, PNG | 1             | pixels                       | pixels            | color channels  |
/// | GIF       | frames        | pixels                       | pixels            | 4 (RGBA)        |
/// | WAV       | PCM frames    | samples (frames × channels)  | sample rate in Hz | audio channels  |
///
/// For audio `height` is not a spatial dimension. The overloading is kept so
/// one descriptor type serves every format.
///
/// All fields are zero until populated by [`probe_shape`](crate::probe_shape).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor {
    /// Temporal dimension. 1 for still images.
    pub frame_count: usize,
    /// Pixel columns, or total interleaved samples for audio.
    pub width: usize,
    /// Pixel rows, or sample rate for audio.
    pub height: usize,
    /// Color or audio channels.
    pub channel_count: usize,
    /// Width of one scalar: 1, 2, 4 or 8.
    pub bytes_per_scalar_element: usize,
    /// Whether scalars are two's-complement.
    pub is_signed: bool,
}

impl ShapeDescriptor {
    /// Still image: one frame of `width × height × channels`.
    pub fn image(width: usize, height: usize, channels: usize, bytes: usize) -> Self {
        Self {
            frame_count: 1,
            width,
            height,
            channel_count: channels,
            bytes_per_scalar_element: bytes,
            is_signed: false,
        }
    }

    /// Frame sequence of equally sized frames.
    pub fn animation(
        frames: usize,
        width: usize,
        height: usize,
        channels: usize,
        bytes: usize,
    ) -> Self {
        Self {
            frame_count: frames,
            ..Self::image(width, height, channels, bytes)
        }
    }

    /// Interleaved PCM. `width` becomes `frames × channels` and `height`
    /// carries the sample rate.
    pub fn audio(
        pcm_frames: usize,
        channels: usize,
        sample_rate: usize,
        bytes: usize,
        is_signed: bool,
    ) -> Self {
        Self {
            frame_count: pcm_frames,
            width: pcm_frames.saturating_mul(channels),
            height: sample_rate,
            channel_count: channels,
            bytes_per_scalar_element: bytes,
            is_signed,
        }
    }

    /// Set the signedness flag.
    pub fn with_signed(mut self, is_signed: bool) -> Self {
        self.is_signed = is_signed;
        self
    }

    /// Sample rate of an audio shape.
    pub fn sample_rate(&self) -> usize {
        self.height
    }

    /// Check the descriptor's own invariants.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if !matches!(self.bytes_per_scalar_element, 1 | 2 | 4 | 8) {
            return Err(DecodeError::InvalidShape(
                "bytes_per_scalar_element must be 1, 2, 4 or 8",
            ));
        }
        if self.channel_count == 0 {
            return Err(DecodeError::InvalidShape("channel_count must be at least 1"));
        }
        Ok(())
    }

    /// Bytes a decode of this shape writes.
    ///
    /// Audio: `width × bytes` (width already counts every channel's samples).
    /// Everything else: `frames × channels × width × height × bytes`.
    pub fn required_bytes(&self, format: MediaFormat) -> Result<usize, DecodeError> {
        let size = if format.is_audio() {
            self.width.checked_mul(self.bytes_per_scalar_element)
        } else {
            self.frame_stride()
                .and_then(|stride| stride.checked_mul(self.frame_count))
        };
        size.ok_or(DecodeError::InvalidShape("shape size overflows usize"))
    }

    /// Bytes of one image frame: `channels × height × width × bytes`.
    pub fn frame_stride(&self) -> Option<usize> {
        self.channel_count
            .checked_mul(self.height)?
            .checked_mul(self.width)?
            .checked_mul(self.bytes_per_scalar_element)
    }

    /// Scalars in one decoded tensor.
    pub fn element_count(&self, format: MediaFormat) -> Result<usize, DecodeError> {
        Ok(self.required_bytes(format)? / self.bytes_per_scalar_element.max(1))
    }
}
