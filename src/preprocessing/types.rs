//! # Shared Types for Image Preprocessing
//!
//! The pixel grid produced by decoding and downsampling an upload. Feature
//! extraction reads it; nothing mutates it once built.

use image::RgbImage;

/// An immutable row-major grid of RGB triples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    pixels: Vec<[u8; 3]>,
    width: u32,
    height: u32,
}

impl PixelGrid {
    /// Builds a grid from row-major pixels.
    ///
    /// Returns `None` when `pixels.len()` does not match `width * height`.
    pub fn new(pixels: Vec<[u8; 3]>, width: u32, height: u32) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> [u8; 3],
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// A grid where every pixel has the same color.
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// Pixels of rows `0..rows`, clipped to the grid height.
    pub fn top_rows(&self, rows: u32) -> &[[u8; 3]] {
        let rows = rows.min(self.height) as usize;
        &self.pixels[..rows * self.width as usize]
    }
}

impl From<RgbImage> for PixelGrid {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.pixels().map(|p| p.0).collect();
        Self {
            pixels,
            width,
            height,
        }
    }
}
