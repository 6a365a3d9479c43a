//! Decoded samples as `ndarray` arrays.

#![cfg(feature = "ndarray")]

use std::path::Path;

use ndarray::s;
use tenpack::{DecodeError, ElementType, TensorArray, unpack};

fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    std::fs::read(path).unwrap()
}

#[test]
fn image_is_hwc() {
    let unpacked = unpack(&fixture("png_white.png"), &mut None).unwrap();
    let array = unpacked.to_array::<u8>().unwrap();
    assert_eq!(array.shape(), [2, 2, 3]);
    assert!(array.iter().all(|&v| v == 255));
}

#[test]
fn animation_is_fhwc() {
    let unpacked = unpack(&fixture("gif_two_frames.gif"), &mut None).unwrap();
    let array = unpacked.to_array::<u8>().unwrap();
    assert_eq!(array.shape(), [2, 2, 2, 4]);
    let top_left = array.slice(s![.., 0, 0, ..]);
    assert_eq!(top_left.row(0).to_vec(), [255, 0, 0, 255]);
    assert_eq!(top_left.row(1).to_vec(), [0, 0, 255, 255]);
}

#[test]
fn audio_is_flat_signed() {
    let unpacked = unpack(&fixture("wav_stereo16.wav"), &mut None).unwrap();
    match unpacked.to_ndarray().unwrap() {
        TensorArray::I16(array) => {
            assert_eq!(array.shape(), [6]);
            assert_eq!(array[[3]], i16::MAX);
        }
        other => panic!("expected int16, got {}", other.element_type()),
    }
}

#[test]
fn wrong_element_type_is_rejected() {
    let unpacked = unpack(&fixture("wav_stereo16.wav"), &mut None).unwrap();
    assert_eq!(unpacked.tensor.element_type, ElementType::I16);
    assert!(matches!(
        unpacked.to_array::<u8>(),
        Err(DecodeError::ShapeMismatch { .. })
    ));
}
