//! Small synthetic inputs shared by the unit tests.

use std::borrow::Cow;

use ::gif::{DisposalMethod, Encoder, Frame};
use ::png::{BitDepth, ColorType};

/// 2x2 YCbCr JPEG, every pixel white.
pub const JPEG_WHITE: &[u8] = include_bytes!("../tests/fixtures/jpeg_white.jpg");
/// 2x2 YCbCr JPEG, every pixel black.
pub const JPEG_BLACK: &[u8] = include_bytes!("../tests/fixtures/jpeg_black.jpg");
/// 2x2 single-component JPEG.
pub const JPEG_GRAY: &[u8] = include_bytes!("../tests/fixtures/jpeg_gray.jpg");

/// Encode raw (packed, big-endian for 16-bit) scanlines as a PNG.
pub fn png(width: u32, height: u32, color: ColorType, depth: BitDepth, data: &[u8]) -> Vec<u8> {
    encode_png(width, height, color, depth, None, data)
}

/// Indexed PNG with a two-entry palette: 0 is red, 1 is blue.
pub fn png_indexed(width: u32, height: u32, depth: BitDepth, indices: &[u8]) -> Vec<u8> {
    let palette = [255, 0, 0, 0, 0, 255];
    encode_png(
        width,
        height,
        ColorType::Indexed,
        depth,
        Some(&palette),
        indices,
    )
}

fn encode_png(
    width: u32,
    height: u32,
    color: ColorType,
    depth: BitDepth,
    palette: Option<&[u8]>,
    data: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(palette) = palette {
            encoder.set_palette(palette.to_vec());
        }
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
        writer.finish().unwrap();
    }
    out
}

const GIF_PALETTE: [u8; 6] = [255, 0, 0, 0, 0, 255];
const RED: u8 = 0;
const BLUE: u8 = 1;

fn gif_frame(left: u16, top: u16, width: u16, height: u16, index: u8) -> Frame<'static> {
    Frame {
        left,
        top,
        width,
        height,
        dispose: DisposalMethod::Keep,
        buffer: Cow::Owned(vec![index; usize::from(width) * usize::from(height)]),
        ..Frame::default()
    }
}

fn encode_gif(frames: &[Frame<'_>]) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new(), 2, 2, &GIF_PALETTE).unwrap();
    for frame in frames {
        encoder.write_frame(frame).unwrap();
    }
    encoder.into_inner().unwrap()
}

/// 2x2 animation: a full red frame, then a 1x1 blue patch at the origin.
pub fn gif_two_frames() -> Vec<u8> {
    encode_gif(&[gif_frame(0, 0, 2, 2, RED), gif_frame(0, 0, 1, 1, BLUE)])
}

/// Three frames: full red, blue at (0, 0) disposed with `dispose`, red at (1, 1).
pub fn gif_with_disposal(dispose: DisposalMethod) -> Vec<u8> {
    let patch = Frame {
        dispose,
        ..gif_frame(0, 0, 1, 1, BLUE)
    };
    encode_gif(&[gif_frame(0, 0, 2, 2, RED), patch, gif_frame(1, 1, 1, 1, RED)])
}

fn riff_wave(fmt: &[u8], data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"WAVE");
    body.extend_from_slice(b"fmt ");
    body.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
    body.extend_from_slice(fmt);
    body.extend_from_slice(b"data");
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(data);

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn wave_format(tag: u16, channels: u16, rate: u32, container_bits: u16, bits: u16) -> Vec<u8> {
    let block = channels * container_bits / 8;
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&tag.to_le_bytes());
    fmt.extend_from_slice(&channels.to_le_bytes());
    fmt.extend_from_slice(&rate.to_le_bytes());
    fmt.extend_from_slice(&(rate * u32::from(block)).to_le_bytes());
    fmt.extend_from_slice(&block.to_le_bytes());
    fmt.extend_from_slice(&bits.to_le_bytes());
    fmt
}

/// Plain `WAVE_FORMAT_PCM` stream of already little-endian sample bytes.
pub fn wav(channels: u16, rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
    riff_wave(&wave_format(1, channels, rate, bits, bits), data)
}

/// Plain `WAVE_FORMAT_PCM` declaring `valid_bits` in a wider `container_bits`.
pub fn wav_packed(
    channels: u16,
    rate: u32,
    valid_bits: u16,
    container_bits: u16,
    data: &[u8],
) -> Vec<u8> {
    riff_wave(
        &wave_format(1, channels, rate, container_bits, valid_bits),
        data,
    )
}

pub fn wav_pcm16(channels: u16, rate: u32, samples: &[i16]) -> Vec<u8> {
    let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    wav(channels, rate, 16, &data)
}

/// `WAVE_FORMAT_EXTENSIBLE` PCM with `valid_bits` stored in `container_bits`.
pub fn wav_extensible(
    channels: u16,
    rate: u32,
    valid_bits: u16,
    container_bits: u16,
    data: &[u8],
) -> Vec<u8> {
    const SUBTYPE_PCM: [u8; 16] = [
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b,
        0x71,
    ];
    let mut fmt = wave_format(0xFFFE, channels, rate, container_bits, container_bits);
    fmt.extend_from_slice(&22u16.to_le_bytes());
    fmt.extend_from_slice(&valid_bits.to_le_bytes());
    let mask: u32 = (1 << channels) - 1;
    fmt.extend_from_slice(&mask.to_le_bytes());
    fmt.extend_from_slice(&SUBTYPE_PCM);
    riff_wave(&fmt, data)
}

/// 32-bit `WAVE_FORMAT_IEEE_FLOAT` stream.
pub fn wav_float(channels: u16, rate: u32, data: &[u8]) -> Vec<u8> {
    riff_wave(&wave_format(3, channels, rate, 32, 32), data)
}
