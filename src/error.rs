//! Error taxonomy for sniffing, probing and unpacking.

use crate::format::MediaFormat;
use crate::limits::LimitExceeded;

/// Failure of any core operation.
///
/// Every variant is reported to the immediate caller. Nothing is retried and a
/// failed call never releases the [`DecoderContext`](crate::DecoderContext) it
/// ran against.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// No signature matched the input bytes.
    #[error("unrecognized format: no known signature matched")]
    UnrecognizedFormat,

    /// The format was classified, but there is no prober or unpacker for it.
    #[error("{0} was recognized but cannot be probed or unpacked")]
    RecognizedUnsupportedFormat(MediaFormat),

    /// The codec rejected the header (truncated or corrupt input).
    #[error("{format} header could not be parsed: {reason}")]
    HeaderParseFailure {
        format: MediaFormat,
        reason: String,
    },

    /// The requested element width / channel count has no codec output mode.
    #[error(
        "{format} cannot produce {channel_count} channel(s) of {bytes_per_scalar_element}-byte samples"
    )]
    UnsupportedLayout {
        format: MediaFormat,
        bytes_per_scalar_element: usize,
        channel_count: usize,
    },

    /// One frame (or audio packet) failed mid-sequence. The whole call is void.
    #[error("frame {frame} failed to decode: {reason}")]
    FrameDecodeFailure { frame: usize, reason: String },

    /// Caller-supplied output buffer is smaller than the shape requires.
    #[error("output buffer holds {actual} bytes but {required} are required")]
    BufferSizeMismatch { required: usize, actual: usize },

    /// The shape descriptor violates its own invariants.
    #[error("invalid shape: {0}")]
    InvalidShape(&'static str),

    /// The shape does not describe the bytes being decoded.
    #[error("shape {field} is {actual} but the stream has {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The audio stream ended before the declared number of samples.
    #[error("stream ended after {actual} of {expected} samples")]
    Truncated { expected: usize, actual: usize },

    /// A configured resource limit was exceeded.
    #[error(transparent)]
    LimitExceeded(#[from] LimitExceeded),
}

impl DecodeError {
    pub(crate) fn header(format: MediaFormat, reason: impl ToString) -> Self {
        Self::HeaderParseFailure {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn layout(format: MediaFormat, bytes: usize, channels: usize) -> Self {
        Self::UnsupportedLayout {
            format,
            bytes_per_scalar_element: bytes,
            channel_count: channels,
        }
    }

    pub(crate) fn frame(frame: usize, reason: impl ToString) -> Self {
        Self::FrameDecodeFailure {
            frame,
            reason: reason.to_string(),
        }
    }

    /// Whether the input bytes were classified at all.
    ///
    /// `false` only for [`DecodeError::UnrecognizedFormat`], which lets callers
    /// tell "not media" apart from "media we cannot handle".
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::UnrecognizedFormat)
    }
}
