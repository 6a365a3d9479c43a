//! Decoder context: lazily created per-family handles.
//!
//! A context owns at most one handle per [`CodecFamily`]. Handles are created
//! on first use and reused by every later probe and decode through the same
//! context, so headers parsed by a probe (and, for GIF and WAV, the decoded
//! stream itself) carry over to the decode that follows.
//!
//! Contexts are plain owned values: share one per worker, never across
//! threads. [`DecoderContext::release`] tears every handle down and may be
//! called any number of times; dropping the context releases it as well.

use crate::codecs::{Decoding, GifHandle, JpegHandle, PngHandle, WavHandle};
use crate::format::CodecFamily;
use crate::limits::ResourceLimits;

/// Per-family decoder handles plus the limits applied to every call.
#[derive(Debug, Default)]
pub struct DecoderContext {
    limits: ResourceLimits,
    jpeg: Option<JpegHandle>,
    png: Option<PngHandle>,
    gif: Option<GifHandle>,
    wav: Option<WavHandle>,
}

fn create<H: Default>(slot: &mut Option<H>, family: CodecFamily) -> &mut H {
    slot.get_or_insert_with(|| {
        log::trace!("creating {family:?} decoder handle");
        H::default()
    })
}

impl DecoderContext {
    /// Empty context with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty context enforcing `limits` on every probe and decode.
    pub fn with_limits(limits: ResourceLimits) -> Self {
        let mut ctx = Self::default();
        ctx.limits = limits;
        ctx
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Replace the limits. Live handles are kept.
    pub fn set_limits(&mut self, limits: ResourceLimits) {
        self.limits = limits;
    }

    pub fn jpeg(&mut self) -> &mut JpegHandle {
        create(&mut self.jpeg, CodecFamily::Jpeg)
    }

    pub fn png(&mut self) -> &mut PngHandle {
        create(&mut self.png, CodecFamily::Png)
    }

    pub fn gif(&mut self) -> &mut GifHandle {
        create(&mut self.gif, CodecFamily::Gif)
    }

    pub fn wav(&mut self) -> &mut WavHandle {
        create(&mut self.wav, CodecFamily::Wav)
    }

    /// Handle for `family`, created on first request.
    pub fn get_or_create(&mut self, family: CodecFamily) -> &mut dyn Decoding {
        match family {
            CodecFamily::Jpeg => self.jpeg(),
            CodecFamily::Png => self.png(),
            CodecFamily::Gif => self.gif(),
            CodecFamily::Wav => self.wav(),
        }
    }

    /// Split borrow of the limits and the handle for `family`.
    pub(crate) fn handle_with_limits(
        &mut self,
        family: CodecFamily,
    ) -> (&ResourceLimits, &mut dyn Decoding) {
        let handle: &mut dyn Decoding = match family {
            CodecFamily::Jpeg => create::<JpegHandle>(&mut self.jpeg, family),
            CodecFamily::Png => create::<PngHandle>(&mut self.png, family),
            CodecFamily::Gif => create::<GifHandle>(&mut self.gif, family),
            CodecFamily::Wav => create::<WavHandle>(&mut self.wav, family),
        };
        (&self.limits, handle)
    }

    pub fn is_live(&self, family: CodecFamily) -> bool {
        match family {
            CodecFamily::Jpeg => self.jpeg.is_some(),
            CodecFamily::Png => self.png.is_some(),
            CodecFamily::Gif => self.gif.is_some(),
            CodecFamily::Wav => self.wav.is_some(),
        }
    }

    /// Families with a live handle, in [`CodecFamily::ALL`] order.
    pub fn live_handles(&self) -> Vec<CodecFamily> {
        CodecFamily::ALL
            .into_iter()
            .filter(|&family| self.is_live(family))
            .collect()
    }

    /// Reset and drop every live handle. Limits are kept.
    pub fn release(&mut self) {
        let mut released = 0;
        released += teardown(&mut self.jpeg);
        released += teardown(&mut self.png);
        released += teardown(&mut self.gif);
        released += teardown(&mut self.wav);
        if released > 0 {
            log::debug!("released {released} decoder handle(s)");
        }
    }
}

fn teardown<H: Decoding>(slot: &mut Option<H>) -> usize {
    match slot.take() {
        Some(mut handle) => {
            handle.reset();
            1
        }
        None => 0,
    }
}

impl Drop for DecoderContext {
    fn drop(&mut self) {
        self.release();
    }
}

/// The caller's context, created with default limits if absent.
pub(crate) fn vivify(ctx: &mut Option<DecoderContext>) -> &mut DecoderContext {
    ctx.get_or_insert_with(DecoderContext::new)
}

/// Release the context held in `ctx`, if any, and leave `None` behind.
///
/// Safe to call repeatedly and on a slot that never held a context.
pub fn release(ctx: &mut Option<DecoderContext>) {
    if let Some(mut context) = ctx.take() {
        context.release();
    }
}
