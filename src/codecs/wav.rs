//! WAV via `symphonia`'s RIFF reader and PCM decoder.
//!
//! Only integer PCM is unpacked. The element width follows the container
//! sample width: 8-bit is unsigned, 12/16-bit land in `i16` (12-bit samples
//! stay as stored, left-justified in their 16-bit container), 24-bit and
//! 32-bit land in `i32` with 24-bit samples shifted to the top of the word.
//! Float, A-law, mu-law and ADPCM streams are unsupported layouts.

use std::fmt;
use std::io::{self, Cursor};

use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{
    CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64LE, CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24LE,
    CODEC_TYPE_PCM_S32LE, CODEC_TYPE_PCM_U8, CodecParameters, Decoder, DecoderOptions,
};
use symphonia::core::conv::ConvertibleSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::default::codecs::PcmDecoder;
use symphonia::default::formats::WavReader;

use super::{Decoding, Fingerprint, check_extent};
use crate::capabilities::CodecCapabilities;
use crate::error::DecodeError;
use crate::format::{CodecFamily, MediaFormat};
use crate::layout::SampleLayout;
use crate::limits::ResourceLimits;
use crate::shape::ShapeDescriptor;

static CAPS: CodecCapabilities = CodecCapabilities::new()
    .with_cheap_probe(true)
    .with_layouts(&[
        SampleLayout::PcmU8,
        SampleLayout::PcmS16,
        SampleLayout::PcmS32,
    ]);

/// Fields a caller's audio shape must agree on with the stream.
const AUDIO_EXTENT: &[&str] = &["width", "height", "channel_count"];

/// An opened stream: parsed RIFF/fmt chunks, positioned at the first packet.
struct WavSession {
    fingerprint: Fingerprint,
    reader: WavReader,
    decoder: PcmDecoder,
    track_id: u32,
    shape: ShapeDescriptor,
}

impl WavSession {
    fn open(data: &[u8], fingerprint: Fingerprint) -> Result<Self, DecodeError> {
        // The reader wants an owned, 'static source.
        let mut riff = data.to_vec();
        widen_pcm_container(&mut riff);
        let source = MediaSourceStream::new(Box::new(Cursor::new(riff)), Default::default());
        let reader = WavReader::try_new(source, &FormatOptions::default())
            .map_err(|e| DecodeError::header(MediaFormat::Wav, e))?;
        let track = reader
            .default_track()
            .ok_or_else(|| DecodeError::header(MediaFormat::Wav, "no audio track"))?;
        let track_id = track.id;
        let shape = shape_of(&track.codec_params)?;
        let decoder = PcmDecoder::try_new(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::header(MediaFormat::Wav, e))?;
        log::trace!(
            "opened WAV stream: {} channel(s) at {} Hz, {} samples",
            shape.channel_count,
            shape.sample_rate(),
            shape.width
        );
        Ok(Self {
            fingerprint,
            reader,
            decoder,
            track_id,
            shape,
        })
    }
}

/// Raise a plain-PCM `fmt ` chunk's sample width to its container width.
///
/// Widths such as 12 bits are stored left-justified in whole-byte containers,
/// and the RIFF reader only accepts 8, 16, 24 and 32. Anything else is left
/// for the reader to reject.
fn widen_pcm_container(riff: &mut [u8]) {
    const WAVE_FORMAT_PCM: u16 = 1;
    fn le16(b: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([b[at], b[at + 1]])
    }

    let mut pos: usize = 12;
    while let Some(header) = pos.checked_add(8).and_then(|end| riff.get(pos..end)) {
        let is_fmt = &header[..4] == b"fmt ";
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let body = pos + 8;
        if is_fmt {
            let Some(fmt) = riff.get_mut(body..body.saturating_add(16)) else {
                return;
            };
            let channels = le16(fmt, 2);
            let bits = le16(fmt, 14);
            if le16(fmt, 0) != WAVE_FORMAT_PCM || bits % 8 == 0 || channels == 0 {
                return;
            }
            let container = le16(fmt, 12) / channels * 8;
            if container > bits && matches!(container, 8 | 16 | 24 | 32) {
                log::trace!("widening {bits}-bit PCM to its {container}-bit container");
                fmt[14..16].copy_from_slice(&container.to_le_bytes());
            }
            return;
        }
        // Chunks are padded to an even length.
        pos = body.saturating_add(len).saturating_add(len & 1);
    }
}

fn shape_of(params: &CodecParameters) -> Result<ShapeDescriptor, DecodeError> {
    let channels = params
        .channels
        .map(|channels| channels.count())
        .ok_or_else(|| DecodeError::header(MediaFormat::Wav, "missing channel count"))?;
    let bytes = match params.codec {
        CODEC_TYPE_PCM_U8 => 1,
        CODEC_TYPE_PCM_S16LE => 2,
        CODEC_TYPE_PCM_S24LE | CODEC_TYPE_PCM_S32LE => 4,
        CODEC_TYPE_PCM_F32LE => return Err(DecodeError::layout(MediaFormat::Wav, 4, channels)),
        CODEC_TYPE_PCM_F64LE => return Err(DecodeError::layout(MediaFormat::Wav, 8, channels)),
        _ => {
            let bits = params
                .bits_per_coded_sample
                .or(params.bits_per_sample)
                .unwrap_or(0) as usize;
            return Err(DecodeError::layout(MediaFormat::Wav, bits.div_ceil(8), channels));
        }
    };
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| DecodeError::header(MediaFormat::Wav, "missing sample rate"))?;
    let frames = params
        .n_frames
        .ok_or_else(|| DecodeError::header(MediaFormat::Wav, "missing data length"))?;
    let frames = usize::try_from(frames)
        .map_err(|_| DecodeError::InvalidShape("PCM frame count overflows usize"))?;
    let is_signed = params.codec != CODEC_TYPE_PCM_U8;
    Ok(ShapeDescriptor::audio(
        frames,
        channels,
        sample_rate as usize,
        bytes,
        is_signed,
    ))
}

/// Scalar written to the output buffer in native byte order.
trait PcmSample: ConvertibleSample + Copy {
    const WIDTH: usize;
    fn put(self, out: &mut [u8]);
}

impl PcmSample for u8 {
    const WIDTH: usize = 1;
    fn put(self, out: &mut [u8]) {
        out[0] = self;
    }
}

impl PcmSample for i16 {
    const WIDTH: usize = 2;
    fn put(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_ne_bytes());
    }
}

impl PcmSample for i32 {
    const WIDTH: usize = 4;
    fn put(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_ne_bytes());
    }
}

/// Interleave one decoded packet into `out`. Returns bytes written; samples
/// past the end of `out` are dropped.
fn copy_samples<S: PcmSample>(decoded: AudioBufferRef<'_>, out: &mut [u8]) -> usize {
    let mut samples = SampleBuffer::<S>::new(decoded.capacity() as u64, *decoded.spec());
    samples.copy_interleaved_ref(decoded);
    let mut written = 0;
    for (dst, &sample) in out.chunks_exact_mut(S::WIDTH).zip(samples.samples()) {
        sample.put(dst);
        written += S::WIDTH;
    }
    written
}

/// Holds the stream opened by the last probe so the decode that follows
/// does not parse the RIFF chunks again.
#[derive(Default)]
pub struct WavHandle {
    session: Option<WavSession>,
}

impl fmt::Debug for WavHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WavHandle")
            .field("session", &self.session.as_ref().map(|s| s.shape))
            .finish()
    }
}

impl WavHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the cached session for `data`, or open a fresh one.
    fn session(&mut self, data: &[u8]) -> Result<WavSession, DecodeError> {
        let fingerprint = Fingerprint::of(data);
        match self.session.take() {
            Some(session) if session.fingerprint == fingerprint => Ok(session),
            stale => {
                if stale.is_some() {
                    log::warn!("discarding WAV stream opened for a different input");
                }
                WavSession::open(data, fingerprint)
            }
        }
    }
}

impl Decoding for WavHandle {
    fn family(&self) -> CodecFamily {
        CodecFamily::Wav
    }

    fn capabilities(&self) -> &'static CodecCapabilities {
        &CAPS
    }

    fn probe_header(
        &mut self,
        data: &[u8],
        _limits: &ResourceLimits,
    ) -> Result<ShapeDescriptor, DecodeError> {
        let session = self.session(data)?;
        let shape = session.shape;
        self.session = Some(session);
        Ok(shape)
    }

    fn decode_into(
        &mut self,
        data: &[u8],
        shape: &ShapeDescriptor,
        layout: SampleLayout,
        out: &mut [u8],
        _limits: &ResourceLimits,
    ) -> Result<(), DecodeError> {
        // A consumed stream cannot be rewound, so the session is never put back.
        let mut session = self.session(data)?;
        check_extent(shape, &session.shape, AUDIO_EXTENT)?;
        let native = SampleLayout::for_pcm(
            session.shape.bytes_per_scalar_element,
            session.shape.is_signed,
        );
        if native != Some(layout) {
            return Err(DecodeError::layout(
                MediaFormat::Wav,
                shape.bytes_per_scalar_element,
                shape.channel_count,
            ));
        }

        let mut written = 0;
        let mut packet_index = 0;
        while written < out.len() {
            let packet = match session.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(DecodeError::frame(packet_index, e)),
            };
            if packet.track_id() != session.track_id {
                continue;
            }
            let decoded = session
                .decoder
                .decode(&packet)
                .map_err(|e| DecodeError::frame(packet_index, e))?;
            let remaining = &mut out[written..];
            written += match layout {
                SampleLayout::PcmU8 => copy_samples::<u8>(decoded, remaining),
                SampleLayout::PcmS16 => copy_samples::<i16>(decoded, remaining),
                _ => copy_samples::<i32>(decoded, remaining),
            };
            packet_index += 1;
        }

        if written < out.len() {
            let width = layout.bytes_per_scalar();
            return Err(DecodeError::Truncated {
                expected: out.len() / width,
                actual: written / width,
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.session = None;
    }
}
