//! Media format detection from magic bytes.

use core::fmt;

use crate::error::DecodeError;

/// Formats the signature matcher can tell apart.
///
/// Classification is a pure function of the leading bytes. Only the formats
/// with a [`CodecFamily`] can be probed and unpacked; the rest are recognized
/// so callers can report "known but unsupported" instead of "garbage".
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Ico,
    Jpeg2000,
    Jxr,
    Wav,
    Avi,
    Mpeg4,
    Psd,
    Dwg,
    Unknown,
}

/// Broad content category of a [`MediaFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Single still image, tensor layout `[height, width, channels]`.
    Image,
    /// Frame sequence, tensor layout `[frames, height, width, channels]`.
    Animation,
    /// Interleaved PCM, tensor layout `[samples]`.
    Audio,
    Video,
    Document,
}

/// Codec families with a prober and unpacker. One decoder handle per family
/// lives in a [`DecoderContext`](crate::DecoderContext).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecFamily {
    Jpeg,
    Png,
    Gif,
    Wav,
}

impl CodecFamily {
    /// Every family, in context teardown order.
    pub const ALL: [CodecFamily; 4] = [
        CodecFamily::Jpeg,
        CodecFamily::Png,
        CodecFamily::Gif,
        CodecFamily::Wav,
    ];

    /// The format this family decodes.
    pub fn format(self) -> MediaFormat {
        match self {
            CodecFamily::Jpeg => MediaFormat::Jpeg,
            CodecFamily::Png => MediaFormat::Png,
            CodecFamily::Gif => MediaFormat::Gif,
            CodecFamily::Wav => MediaFormat::Wav,
        }
    }
}

/// One signature. Every `(offset, bytes)` part must match.
struct Signature {
    format: MediaFormat,
    parts: &'static [(usize, &'static [u8])],
}

/// Priority order: the first matching entry wins.
const SIGNATURES: &[Signature] = &[
    Signature {
        format: MediaFormat::Jpeg,
        parts: &[(0, &[0xFF, 0xD8, 0xFF])],
    },
    Signature {
        format: MediaFormat::Png,
        parts: &[(0, &[0x89, 0x50, 0x4E, 0x47])],
    },
    Signature {
        format: MediaFormat::Gif,
        parts: &[(0, b"GIF")],
    },
    Signature {
        format: MediaFormat::Bmp,
        parts: &[(0, b"BM")],
    },
    // JP2 signature box: length 12, type "jP  ", content 0D 0A 87 0A
    Signature {
        format: MediaFormat::Jpeg2000,
        parts: &[(
            0,
            &[
                0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
            ],
        )],
    },
    Signature {
        format: MediaFormat::Jxr,
        parts: &[(0, &[0x49, 0x49, 0xBC])],
    },
    Signature {
        format: MediaFormat::Psd,
        parts: &[(0, b"8BPS")],
    },
    Signature {
        format: MediaFormat::Ico,
        parts: &[(0, &[0x00, 0x00, 0x01, 0x00])],
    },
    Signature {
        format: MediaFormat::Dwg,
        parts: &[(0, b"AC10")],
    },
    Signature {
        format: MediaFormat::Wav,
        parts: &[(0, b"RIFF"), (8, b"WAVE")],
    },
    Signature {
        format: MediaFormat::Avi,
        parts: &[(0, b"RIFF"), (8, b"AVI ")],
    },
    Signature {
        format: MediaFormat::Mpeg4,
        parts: &[(4, b"ftypisom")],
    },
    Signature {
        format: MediaFormat::Mpeg4,
        parts: &[(4, b"ftypiso2")],
    },
    Signature {
        format: MediaFormat::Mpeg4,
        parts: &[(4, b"ftypmp41")],
    },
    Signature {
        format: MediaFormat::Mpeg4,
        parts: &[(4, b"ftypmp42")],
    },
];

/// Compare `magic` against `data[offset..]`. Out-of-bounds is a non-match.
fn matches_at(data: &[u8], offset: usize, magic: &[u8]) -> bool {
    offset
        .checked_add(magic.len())
        .and_then(|end| data.get(offset..end))
        .is_some_and(|window| window == magic)
}

impl MediaFormat {
    /// Every variant, `Unknown` last.
    pub const ALL: [MediaFormat; 13] = [
        MediaFormat::Jpeg,
        MediaFormat::Png,
        MediaFormat::Gif,
        MediaFormat::Bmp,
        MediaFormat::Ico,
        MediaFormat::Jpeg2000,
        MediaFormat::Jxr,
        MediaFormat::Wav,
        MediaFormat::Avi,
        MediaFormat::Mpeg4,
        MediaFormat::Psd,
        MediaFormat::Dwg,
        MediaFormat::Unknown,
    ];

    /// Bytes needed to evaluate every signature. Shorter inputs are still
    /// classified, they just match fewer formats.
    pub const SNIFF_BYTES: usize = 12;

    /// Detect the format from magic bytes. Returns [`MediaFormat::Unknown`]
    /// if nothing matches.
    pub fn detect(data: &[u8]) -> Self {
        SIGNATURES
            .iter()
            .find(|sig| {
                sig.parts
                    .iter()
                    .all(|&(offset, magic)| matches_at(data, offset, magic))
            })
            .map_or(MediaFormat::Unknown, |sig| sig.format)
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        MediaFormat::ALL.into_iter().find(|format| {
            format
                .extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    /// Codec family that can probe and unpack this format, if any.
    pub fn family(self) -> Option<CodecFamily> {
        match self {
            MediaFormat::Jpeg => Some(CodecFamily::Jpeg),
            MediaFormat::Png => Some(CodecFamily::Png),
            MediaFormat::Gif => Some(CodecFamily::Gif),
            MediaFormat::Wav => Some(CodecFamily::Wav),
            _ => None,
        }
    }

    /// Whether [`probe_shape`](crate::probe_shape) and
    /// [`decode_into`](crate::decode_into) accept this format.
    pub fn is_supported(self) -> bool {
        self.family().is_some()
    }

    /// Content category, `None` for [`MediaFormat::Unknown`].
    pub fn kind(self) -> Option<MediaKind> {
        match self {
            MediaFormat::Jpeg
            | MediaFormat::Png
            | MediaFormat::Bmp
            | MediaFormat::Ico
            | MediaFormat::Jpeg2000
            | MediaFormat::Jxr
            | MediaFormat::Psd => Some(MediaKind::Image),
            MediaFormat::Gif => Some(MediaKind::Animation),
            MediaFormat::Wav => Some(MediaKind::Audio),
            MediaFormat::Avi | MediaFormat::Mpeg4 => Some(MediaKind::Video),
            MediaFormat::Dwg => Some(MediaKind::Document),
            MediaFormat::Unknown => None,
        }
    }

    /// Whether decoded content is interleaved PCM rather than pixels.
    pub fn is_audio(self) -> bool {
        self.kind() == Some(MediaKind::Audio)
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Bmp => "image/bmp",
            MediaFormat::Ico => "image/vnd.microsoft.icon",
            MediaFormat::Jpeg2000 => "image/jp2",
            MediaFormat::Jxr => "image/jxr",
            MediaFormat::Wav => "audio/wav",
            MediaFormat::Avi => "video/x-msvideo",
            MediaFormat::Mpeg4 => "video/mp4",
            MediaFormat::Psd => "image/vnd.adobe.photoshop",
            MediaFormat::Dwg => "image/vnd.dwg",
            MediaFormat::Unknown => "application/octet-stream",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            MediaFormat::Png => &["png"],
            MediaFormat::Gif => &["gif"],
            MediaFormat::Bmp => &["bmp", "dib"],
            MediaFormat::Ico => &["ico"],
            MediaFormat::Jpeg2000 => &["jp2", "j2k", "jpf"],
            MediaFormat::Jxr => &["jxr", "wdp", "hdp"],
            MediaFormat::Wav => &["wav", "wave"],
            MediaFormat::Avi => &["avi"],
            MediaFormat::Mpeg4 => &["mp4", "m4v", "m4a"],
            MediaFormat::Psd => &["psd"],
            MediaFormat::Dwg => &["dwg"],
            MediaFormat::Unknown => &[],
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaFormat::Jpeg => "JPEG",
            MediaFormat::Png => "PNG",
            MediaFormat::Gif => "GIF",
            MediaFormat::Bmp => "BMP",
            MediaFormat::Ico => "ICO",
            MediaFormat::Jpeg2000 => "JPEG 2000",
            MediaFormat::Jxr => "JPEG XR",
            MediaFormat::Wav => "WAV",
            MediaFormat::Avi => "AVI",
            MediaFormat::Mpeg4 => "MPEG-4",
            MediaFormat::Psd => "PSD",
            MediaFormat::Dwg => "DWG",
            MediaFormat::Unknown => "unknown",
        })
    }
}

/// Classify `data` by its signature.
///
/// Fails with [`DecodeError::UnrecognizedFormat`] when nothing matches.
/// Recognized but unsupported formats (BMP, AVI, ...) are returned as-is;
/// they fail later, at probe time.
pub fn classify(data: &[u8]) -> Result<MediaFormat, DecodeError> {
    let format = MediaFormat::detect(data);
    log::debug!("classified {} bytes as {format}", data.len());
    match format {
        MediaFormat::Unknown => Err(DecodeError::UnrecognizedFormat),
        format => Ok(format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_jpeg() {
        assert_eq!(
            MediaFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            MediaFormat::Jpeg
        );
    }

    #[test]
    fn detect_png() {
        assert_eq!(
            MediaFormat::detect(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            MediaFormat::Png
        );
    }

    #[test]
    fn detect_gif() {
        assert_eq!(MediaFormat::detect(b"GIF89a\x01\x00"), MediaFormat::Gif);
        assert_eq!(MediaFormat::detect(b"GIF87a"), MediaFormat::Gif);
    }

    #[test]
    fn detect_bmp_psd_dwg() {
        assert_eq!(MediaFormat::detect(b"BM\x36\x00\x00\x00"), MediaFormat::Bmp);
        assert_eq!(MediaFormat::detect(b"8BPS\x00\x01"), MediaFormat::Psd);
        assert_eq!(MediaFormat::detect(b"AC1015"), MediaFormat::Dwg);
    }

    #[test]
    fn detect_ico_and_jxr() {
        assert_eq!(
            MediaFormat::detect(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x00]),
            MediaFormat::Ico
        );
        assert_eq!(
            MediaFormat::detect(&[0x49, 0x49, 0xBC, 0x01]),
            MediaFormat::Jxr
        );
    }

    #[test]
    fn detect_jpeg2000_needs_full_box() {
        let sig = [
            0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
        ];
        assert_eq!(MediaFormat::detect(&sig), MediaFormat::Jpeg2000);
        assert_eq!(MediaFormat::detect(&sig[..11]), MediaFormat::Unknown);
    }

    #[test]
    fn detect_riff_needs_form_type() {
        assert_eq!(
            MediaFormat::detect(b"RIFF\x24\x00\x00\x00WAVEfmt "),
            MediaFormat::Wav
        );
        assert_eq!(
            MediaFormat::detect(b"RIFF\x24\x00\x00\x00AVI LIST"),
            MediaFormat::Avi
        );
        // WebP is RIFF too, but not a format we know.
        assert_eq!(
            MediaFormat::detect(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            MediaFormat::Unknown
        );
        assert_eq!(
            MediaFormat::detect(b"RIFF\x24\x00\x00\x00WAV"),
            MediaFormat::Unknown
        );
    }

    #[test]
    fn detect_mpeg4_brands() {
        for brand in [&b"isom"[..], b"iso2", b"mp41", b"mp42"] {
            let mut data = b"\x00\x00\x00\x18ftyp".to_vec();
            data.extend_from_slice(brand);
            assert_eq!(MediaFormat::detect(&data), MediaFormat::Mpeg4);
        }
        assert_eq!(
            MediaFormat::detect(b"\x00\x00\x00\x18ftypavif"),
            MediaFormat::Unknown
        );
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(MediaFormat::detect(b"nope"), MediaFormat::Unknown);
        assert_eq!(MediaFormat::detect(&[]), MediaFormat::Unknown);
    }

    #[test]
    fn priority_is_table_order() {
        // ICO and JPEG 2000 share leading zero bytes.
        assert_eq!(
            MediaFormat::detect(&[0x00, 0x00, 0x01, 0x00, 0x6A, 0x50]),
            MediaFormat::Ico
        );
    }

    #[test]
    fn short_prefixes_never_match_or_panic() {
        let samples: [&[u8]; 6] = [
            &[0xFF, 0xD8, 0xFF],
            b"RIFF\x24\x00\x00\x00WAVE",
            b"\x00\x00\x00\x18ftypisom",
            &[
                0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
            ],
            &[0x89, 0x50, 0x4E, 0x47],
            b"8BPS",
        ];
        for sample in samples {
            let full = MediaFormat::detect(sample);
            assert_ne!(full, MediaFormat::Unknown);
            for len in 0..sample.len() {
                let truncated = MediaFormat::detect(&sample[..len]);
                assert_ne!(truncated, full, "{full} matched on {len} bytes");
            }
        }
    }

    #[test]
    fn fuzz_lengths_zero_to_sniff_bytes() {
        let mut seed = 0x2545_F491_u32;
        for len in 0..=MediaFormat::SNIFF_BYTES * 2 {
            for _ in 0..64 {
                let data: Vec<u8> = (0..len)
                    .map(|_| {
                        seed ^= seed << 13;
                        seed ^= seed >> 17;
                        seed ^= seed << 5;
                        (seed >> 24) as u8
                    })
                    .collect();
                let _ = MediaFormat::detect(&data);
            }
        }
    }

    #[test]
    fn classify_reports_unrecognized() {
        assert_eq!(classify(b"\x01"), Err(DecodeError::UnrecognizedFormat));
        assert_eq!(classify(&[]), Err(DecodeError::UnrecognizedFormat));
        assert_eq!(classify(b"BM"), Ok(MediaFormat::Bmp));
    }

    #[test]
    fn family_only_for_decodable_formats() {
        for format in MediaFormat::ALL {
            let expected = matches!(
                format,
                MediaFormat::Jpeg | MediaFormat::Png | MediaFormat::Gif | MediaFormat::Wav
            );
            assert_eq!(format.is_supported(), expected, "{format}");
        }
        for family in CodecFamily::ALL {
            assert_eq!(family.format().family(), Some(family));
        }
    }

    #[test]
    fn kinds() {
        assert_eq!(MediaFormat::Jpeg.kind(), Some(MediaKind::Image));
        assert_eq!(MediaFormat::Gif.kind(), Some(MediaKind::Animation));
        assert_eq!(MediaFormat::Wav.kind(), Some(MediaKind::Audio));
        assert_eq!(MediaFormat::Mpeg4.kind(), Some(MediaKind::Video));
        assert_eq!(MediaFormat::Unknown.kind(), None);
        assert!(MediaFormat::Wav.is_audio());
        assert!(!MediaFormat::Gif.is_audio());
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(MediaFormat::from_extension("JPG"), Some(MediaFormat::Jpeg));
        assert_eq!(MediaFormat::from_extension("Wav"), Some(MediaFormat::Wav));
        assert_eq!(
            MediaFormat::from_extension("jp2"),
            Some(MediaFormat::Jpeg2000)
        );
        assert_eq!(MediaFormat::from_extension("mp4"), Some(MediaFormat::Mpeg4));
        assert_eq!(MediaFormat::from_extension(""), None);
        assert_eq!(MediaFormat::from_extension("tiff"), None);
    }

    #[test]
    fn mime_types() {
        assert_eq!(MediaFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(MediaFormat::Wav.mime_type(), "audio/wav");
        assert_eq!(MediaFormat::Unknown.mime_type(), "application/octet-stream");
    }

    #[test]
    fn display_format() {
        assert_eq!(MediaFormat::Jpeg.to_string(), "JPEG");
        assert_eq!(MediaFormat::Jpeg2000.to_string(), "JPEG 2000");
        assert_eq!(MediaFormat::Mpeg4.to_string(), "MPEG-4");
        assert_eq!(MediaFormat::Unknown.to_string(), "unknown");
    }
}
