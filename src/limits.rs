//! Resource limits for probe and unpack.
//!
//! [`ResourceLimits`] caps what a [`DecoderContext`](crate::DecoderContext)
//! will accept. [`LimitExceeded`] is returned when a check fails. Checks run
//! right after the header probe, before any sample is decoded, and the memory
//! cap is also handed to each codec's own allocator guard.

use crate::format::MediaFormat;
use crate::shape::ShapeDescriptor;

/// Resource limits for probe and unpack operations.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// ```
/// use tenpack::ResourceLimits;
///
/// // Reject anything larger than a 4K RGBA frame.
/// let limits = ResourceLimits::none()
///     .with_max_width(3840)
///     .with_max_height(2160)
///     .with_max_memory(3840 * 2160 * 4);
/// assert!(limits.has_any());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum total pixels (width × height) per frame.
    pub max_pixels: Option<u64>,
    /// Maximum decoded tensor size in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum encoded input size in bytes.
    pub max_input_bytes: Option<u64>,
    /// Maximum number of animation frames.
    pub max_frames: Option<u64>,
    /// Maximum interleaved audio samples.
    pub max_samples: Option<u64>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum decoded size in bytes.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum image width in pixels.
    pub fn with_max_width(mut self, width: u64) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum image height in pixels.
    pub fn with_max_height(mut self, height: u64) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum encoded input size in bytes.
    pub fn with_max_input(mut self, bytes: u64) -> Self {
        self.max_input_bytes = Some(bytes);
        self
    }

    /// Set maximum number of animation frames.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Set maximum interleaved audio samples.
    pub fn with_max_samples(mut self, samples: u64) -> Self {
        self.max_samples = Some(samples);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_memory_bytes.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
            || self.max_input_bytes.is_some()
            || self.max_frames.is_some()
            || self.max_samples.is_some()
    }

    /// Memory cap as a `usize`, saturating on narrow targets.
    pub(crate) fn memory_budget(&self) -> Option<usize> {
        self.max_memory_bytes
            .map(|max| usize::try_from(max).unwrap_or(usize::MAX))
    }

    // --- Validation methods ---

    /// Check image dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a decoded size against `max_memory_bytes`.
    pub fn check_memory(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_memory_bytes
            && bytes > max
        {
            return Err(LimitExceeded::Memory { actual: bytes, max });
        }
        Ok(())
    }

    /// Check encoded input size against `max_input_bytes`.
    pub fn check_input_size(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_input_bytes
            && bytes > max
        {
            return Err(LimitExceeded::InputSize { actual: bytes, max });
        }
        Ok(())
    }

    /// Check frame count against `max_frames`.
    pub fn check_frames(&self, count: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_frames
            && count > max
        {
            return Err(LimitExceeded::Frames { actual: count, max });
        }
        Ok(())
    }

    /// Check interleaved sample count against `max_samples`.
    pub fn check_samples(&self, count: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_samples
            && count > max
        {
            return Err(LimitExceeded::Samples { actual: count, max });
        }
        Ok(())
    }

    /// Check a probed [`ShapeDescriptor`] against every applicable limit.
    ///
    /// Images and animations check dimensions and frames, audio checks the
    /// sample count. All formats check the decoded size against
    /// `max_memory_bytes`.
    pub fn check_shape(
        &self,
        shape: &ShapeDescriptor,
        format: MediaFormat,
    ) -> Result<(), LimitExceeded> {
        if format.is_audio() {
            self.check_samples(shape.width as u64)?;
        } else {
            self.check_dimensions(shape.width as u64, shape.height as u64)?;
            self.check_frames(shape.frame_count as u64)?;
        }
        let bytes = if format.is_audio() {
            (shape.width as u64).saturating_mul(shape.bytes_per_scalar_element as u64)
        } else {
            [
                shape.frame_count,
                shape.channel_count,
                shape.height,
                shape.bytes_per_scalar_element,
            ]
            .into_iter()
            .fold(shape.width as u64, |acc, dim| acc.saturating_mul(dim as u64))
        };
        self.check_memory(bytes)
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LimitExceeded {
    /// Image width exceeded `max_width`.
    #[error("width {actual} exceeds limit {max}")]
    Width { actual: u64, max: u64 },
    /// Image height exceeded `max_height`.
    #[error("height {actual} exceeds limit {max}")]
    Height { actual: u64, max: u64 },
    /// Pixel count exceeded `max_pixels`.
    #[error("pixel count {actual} exceeds limit {max}")]
    Pixels { actual: u64, max: u64 },
    /// Decoded size exceeded `max_memory_bytes`.
    #[error("memory {actual} bytes exceeds limit {max}")]
    Memory { actual: u64, max: u64 },
    /// Input exceeded `max_input_bytes`.
    #[error("input size {actual} bytes exceeds limit {max}")]
    InputSize { actual: u64, max: u64 },
    /// Frame count exceeded `max_frames`.
    #[error("frame count {actual} exceeds limit {max}")]
    Frames { actual: u64, max: u64 },
    /// Sample count exceeded `max_samples`.
    #[error("sample count {actual} exceeds limit {max}")]
    Samples { actual: u64, max: u64 },
}
