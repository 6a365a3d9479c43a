//! Decode into caller buffers, plus the one-call `unpack` conveniences.

use crate::context::{DecoderContext, vivify};
use crate::error::DecodeError;
use crate::format::{MediaFormat, classify};
use crate::probe::family_of;
use crate::shape::ShapeDescriptor;
use crate::tensor::{TensorSpec, tensor_spec};

impl DecoderContext {
    /// Decode `data` into `out` as described by `shape`.
    ///
    /// `shape` normally comes from [`probe_shape`](DecoderContext::probe_shape);
    /// its `channel_count` and `bytes_per_scalar_element` may be changed to
    /// request another layout the codec can write (gray from RGB, 16-bit
    /// widening). Extent fields must match the stream.
    ///
    /// `out` must hold at least `shape.required_bytes(format)` bytes. Only
    /// that prefix is written. On error its contents are unspecified.
    pub fn decode_into(
        &mut self,
        data: &[u8],
        format: MediaFormat,
        shape: &ShapeDescriptor,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        shape.validate()?;
        let required = shape.required_bytes(format)?;
        if out.len() < required {
            return Err(DecodeError::BufferSizeMismatch {
                required,
                actual: out.len(),
            });
        }
        let family = family_of(format)?;
        self.limits().check_input_size(data.len() as u64)?;

        let (limits, handle) = self.handle_with_limits(family);
        let layout = handle.capabilities().select_layout(format, shape)?;
        limits.check_shape(shape, format)?;
        handle.decode_into(data, shape, layout, &mut out[..required], limits)?;
        log::debug!("decoded {format} as {layout:?} into {required} bytes");
        Ok(())
    }
}

/// Decode with the context in `ctx`, creating one if `ctx` is empty.
///
/// The context stays in `ctx` whether or not the decode succeeds.
pub fn decode_into(
    data: &[u8],
    format: MediaFormat,
    shape: &ShapeDescriptor,
    out: &mut [u8],
    ctx: &mut Option<DecoderContext>,
) -> Result<(), DecodeError> {
    vivify(ctx).decode_into(data, format, shape, out)
}

/// A fully decoded blob.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Unpacked {
    pub format: MediaFormat,
    pub shape: ShapeDescriptor,
    pub tensor: TensorSpec,
    /// Native-endian scalars, laid out as `tensor.dims`.
    pub data: Vec<u8>,
}

/// Classify, probe, allocate and decode `data` in one call.
pub fn unpack(data: &[u8], ctx: &mut Option<DecoderContext>) -> Result<Unpacked, DecodeError> {
    let format = classify(data)?;
    let ctx = vivify(ctx);
    let shape = ctx.probe_shape(data, format)?;
    let tensor = tensor_spec(format, &shape)?;
    let mut buf = tensor.zeroed();
    ctx.decode_into(data, format, &shape, &mut buf)?;
    Ok(Unpacked {
        format,
        shape,
        tensor,
        data: buf,
    })
}

/// Classify, probe and decode `data` into `out`, returning the probed shape.
///
/// Size `out` from an earlier probe of the same bytes; a buffer that is too
/// small fails with [`DecodeError::BufferSizeMismatch`].
pub fn unpack_into(
    data: &[u8],
    out: &mut [u8],
    ctx: &mut Option<DecoderContext>,
) -> Result<ShapeDescriptor, DecodeError> {
    let format = classify(data)?;
    let ctx = vivify(ctx);
    let shape = ctx.probe_shape(data, format)?;
    ctx.decode_into(data, format, &shape, out)?;
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CodecFamily;
    use crate::limits::ResourceLimits;
    use crate::tensor::ElementType;
    use crate::testdata;
    use ::png::{BitDepth, ColorType};

    #[test]
    fn canary_after_exact_buffer_survives() {
        let data = testdata::png(2, 2, ColorType::Rgb, BitDepth::Eight, &[200; 12]);
        let mut ctx = DecoderContext::new();
        let shape = ctx.probe_shape(&data, MediaFormat::Png).unwrap();
        let required = shape.required_bytes(MediaFormat::Png).unwrap();
        let mut buf = vec![0u8; required + 1];
        buf[required] = 0xA5;
        ctx.decode_into(&data, MediaFormat::Png, &shape, &mut buf).unwrap();
        assert!(buf[..required].iter().all(|&v| v == 200));
        assert_eq!(buf[required], 0xA5);
    }

    #[test]
    fn short_buffer_is_rejected_untouched() {
        let data = testdata::png(2, 2, ColorType::Rgb, BitDepth::Eight, &[200; 12]);
        let mut ctx = DecoderContext::new();
        let shape = ctx.probe_shape(&data, MediaFormat::Png).unwrap();
        let mut buf = vec![7u8; 11];
        assert_eq!(
            ctx.decode_into(&data, MediaFormat::Png, &shape, &mut buf),
            Err(DecodeError::BufferSizeMismatch {
                required: 12,
                actual: 11
            })
        );
        assert!(buf.iter().all(|&v| v == 7));
    }

    #[test]
    fn invalid_shape_fails_first() {
        let mut buf = [0u8; 4];
        let shape = ShapeDescriptor::image(2, 2, 1, 3);
        assert!(matches!(
            DecoderContext::new().decode_into(b"", MediaFormat::Unknown, &shape, &mut buf),
            Err(DecodeError::InvalidShape(_))
        ));
    }

    #[test]
    fn four_channels_from_jpeg_is_unsupported() {
        let mut ctx = DecoderContext::new();
        let shape = ctx
            .probe_shape(testdata::JPEG_WHITE, MediaFormat::Jpeg)
            .unwrap();
        let rgba = ShapeDescriptor {
            channel_count: 4,
            ..shape
        };
        let mut buf = vec![0u8; rgba.required_bytes(MediaFormat::Jpeg).unwrap()];
        assert_eq!(
            ctx.decode_into(testdata::JPEG_WHITE, MediaFormat::Jpeg, &rgba, &mut buf),
            Err(DecodeError::UnsupportedLayout {
                format: MediaFormat::Jpeg,
                bytes_per_scalar_element: 1,
                channel_count: 4
            })
        );
    }

    #[test]
    fn gray_request_on_rgb_png() {
        let data = testdata::png(1, 1, ColorType::Rgb, BitDepth::Eight, &[255, 255, 255]);
        let mut buf = [0u8; 1];
        let mut ctx = None;
        decode_into(
            &data,
            MediaFormat::Png,
            &ShapeDescriptor::image(1, 1, 1, 1),
            &mut buf,
            &mut ctx,
        )
        .unwrap();
        assert_eq!(buf, [255]);
    }

    #[test]
    fn two_contexts_agree() {
        let data = testdata::gif_two_frames();
        let a = unpack(&data, &mut None).unwrap();
        let b = unpack(&data, &mut Some(DecoderContext::new())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unpack_reports_tensor() {
        let data = testdata::png(3, 2, ColorType::Rgba, BitDepth::Sixteen, &[0; 48]);
        let mut ctx = None;
        let unpacked = unpack(&data, &mut ctx).unwrap();
        assert_eq!(unpacked.format, MediaFormat::Png);
        assert_eq!(unpacked.tensor.element_type, ElementType::U16);
        assert_eq!(unpacked.tensor.dims, [2, 3, 4]);
        assert_eq!(unpacked.data.len(), 48);
    }

    #[test]
    fn unpack_audio() {
        let data = testdata::wav_pcm16(2, 8000, &[1, -1, 2, -2]);
        let unpacked = unpack(&data, &mut None).unwrap();
        assert_eq!(unpacked.tensor.element_type, ElementType::I16);
        assert_eq!(unpacked.tensor.dims, [4]);
        let samples: Vec<i16> = unpacked
            .data
            .chunks_exact(2)
            .map(|b| i16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, [1, -1, 2, -2]);
    }

    #[test]
    fn audio_accepts_frame_scaled_buffer() {
        // frame_count × width × bytes is larger than needed; only the prefix is written.
        let data = testdata::wav_pcm16(1, 8000, &[3, 4]);
        let mut ctx = DecoderContext::new();
        let shape = ctx.probe_shape(&data, MediaFormat::Wav).unwrap();
        let mut buf = vec![0xEEu8; shape.frame_count * shape.width * 2];
        ctx.decode_into(&data, MediaFormat::Wav, &shape, &mut buf).unwrap();
        assert_eq!(&buf[4..], [0xEE; 4]);
    }

    #[test]
    fn unpack_into_returns_shape() {
        let data = testdata::png(2, 1, ColorType::Grayscale, BitDepth::Eight, &[1, 2]);
        let mut buf = [0u8; 2];
        let shape = unpack_into(&data, &mut buf, &mut None).unwrap();
        assert_eq!(shape, ShapeDescriptor::image(2, 1, 1, 1));
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    fn unrecognized_blob() {
        assert_eq!(
            unpack(b"plain text", &mut None),
            Err(DecodeError::UnrecognizedFormat)
        );
    }

    #[test]
    fn failure_does_not_release() {
        let mut ctx = None;
        let mut cut = testdata::gif_two_frames();
        cut.truncate(cut.len() - 6);
        let err = unpack(&cut, &mut ctx).unwrap_err();
        assert!(matches!(err, DecodeError::FrameDecodeFailure { frame: 1, .. }));
        assert!(ctx.as_ref().is_some_and(|c| c.is_live(CodecFamily::Gif)));
    }

    #[test]
    fn memory_limit_blocks_decode() {
        let data = testdata::png(4, 4, ColorType::Rgb, BitDepth::Eight, &[0; 48]);
        let mut ctx = DecoderContext::with_limits(ResourceLimits::none().with_max_memory(40));
        let shape = ShapeDescriptor::image(4, 4, 3, 1);
        let mut buf = [0u8; 48];
        assert!(matches!(
            ctx.decode_into(&data, MediaFormat::Png, &shape, &mut buf),
            Err(DecodeError::LimitExceeded(_))
        ));
    }
}
