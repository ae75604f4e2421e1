//! # Test Helper Library
//!
//! Synthetic image uploads shared by the integration tests.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Encode an image built pixel by pixel
pub fn encode_with<F>(width: u32, height: u32, format: ImageFormat, f: F) -> Vec<u8>
where
    F: Fn(u32, u32) -> [u8; 3],
{
    let img = RgbImage::from_fn(width, height, |x, y| Rgb(f(x, y)));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode test image");
    buf
}

/// A single-color PNG upload
pub fn uniform_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode_with(width, height, ImageFormat::Png, |_, _| rgb)
}

/// A PNG whose rows `0..height/2` are `top` and the rest `bottom`
pub fn split_png(width: u32, height: u32, top: [u8; 3], bottom: [u8; 3]) -> Vec<u8> {
    encode_with(width, height, ImageFormat::Png, |_, y| {
        if y < height / 2 {
            top
        } else {
            bottom
        }
    })
}

/// A gray PNG with the given level on every channel
pub fn gray_png(level: u8) -> Vec<u8> {
    uniform_png(32, 48, [level, level, level])
}

/// PNG signature followed by junk: passes format sniffing, fails decoding
pub fn truncated_png() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(b"not really a png");
    bytes
}
