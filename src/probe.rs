//! Shape probing: header parse into a [`ShapeDescriptor`].

use crate::context::{DecoderContext, vivify};
use crate::error::DecodeError;
use crate::format::{CodecFamily, MediaFormat};
use crate::shape::ShapeDescriptor;

/// Codec family for `format`, or the error a caller sees for formats without one.
pub(crate) fn family_of(format: MediaFormat) -> Result<CodecFamily, DecodeError> {
    match format.family() {
        Some(family) => Ok(family),
        None if format == MediaFormat::Unknown => Err(DecodeError::UnrecognizedFormat),
        None => Err(DecodeError::RecognizedUnsupportedFormat(format)),
    }
}

impl DecoderContext {
    /// Complete shape of `data`, read as `format`.
    ///
    /// For GIF this decodes every frame (the frame count is not in the
    /// header); the composited frames stay in the context for the next
    /// [`decode_into`](DecoderContext::decode_into) of the same bytes.
    pub fn probe_shape(
        &mut self,
        data: &[u8],
        format: MediaFormat,
    ) -> Result<ShapeDescriptor, DecodeError> {
        let family = family_of(format)?;
        self.limits().check_input_size(data.len() as u64)?;
        let (limits, handle) = self.handle_with_limits(family);
        let shape = if handle.capabilities().cheap_probe() {
            handle.probe_header(data, limits)?
        } else {
            handle.probe_full(data, limits)?
        };
        shape.validate()?;
        limits.check_shape(&shape, format)?;
        log::debug!("probed {format}: {shape:?}");
        Ok(shape)
    }

    /// Header-only probe.
    ///
    /// Same as [`probe_shape`](DecoderContext::probe_shape) except that GIF
    /// reports `frame_count` 0 instead of scanning the frames. No limits
    /// beyond the input size are checked.
    pub fn probe_header(
        &mut self,
        data: &[u8],
        format: MediaFormat,
    ) -> Result<ShapeDescriptor, DecodeError> {
        let family = family_of(format)?;
        self.limits().check_input_size(data.len() as u64)?;
        let (limits, handle) = self.handle_with_limits(family);
        handle.probe_header(data, limits)
    }
}

/// Probe `data` with the context in `ctx`, creating one if `ctx` is empty.
///
/// The context is left in `ctx` for later calls; see [`release`](crate::release).
pub fn probe_shape(
    data: &[u8],
    format: MediaFormat,
    ctx: &mut Option<DecoderContext>,
) -> Result<ShapeDescriptor, DecodeError> {
    vivify(ctx).probe_shape(data, format)
}
