//! # Image Decoding and Downsampling
//!
//! Turns uploaded bytes into a bounded-size RGB pixel grid so that feature
//! extraction cost does not depend on the resolution of the original photo.

use image::{imageops::FilterType, DynamicImage, GenericImageView};

use super::types::PixelGrid;
use crate::errors::AnalysisError;

/// Longest side, in pixels, of any grid handed to feature extraction.
pub const MAX_DIMENSION: u32 = 256;

/// Decodes encoded image bytes of any format the `image` crate recognizes.
///
/// # Errors
///
/// Returns `AnalysisError::Decode` if the bytes are not a decodable image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
    image::load_from_memory(bytes).map_err(AnalysisError::from)
}

/// Shrinks an image so neither side exceeds [`MAX_DIMENSION`].
///
/// Aspect ratio is preserved and images already within bounds are returned
/// untouched (never upscaled). Uses cubic (Catmull-Rom) interpolation.
pub fn downsample(image: DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return image;
    }

    let scaled = image.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::CatmullRom);

    tracing::debug!(
        target: "analysis_preprocessing",
        original_width = width,
        original_height = height,
        scaled_width = scaled.width(),
        scaled_height = scaled.height(),
        "Downsampled upload"
    );

    scaled
}

/// Decodes, normalizes to 8-bit RGB and downsamples an upload.
///
/// # Examples
///
/// ```
/// use bodytalk::preprocessing::load_pixel_grid;
///
/// assert!(load_pixel_grid(b"definitely not an image").is_err());
/// ```
pub fn load_pixel_grid(bytes: &[u8]) -> Result<PixelGrid, AnalysisError> {
    let decoded = decode_image(bytes)?;
    let rgb = downsample(decoded).to_rgb8();
    Ok(PixelGrid::from(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(AnalysisError::Decode { .. })));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let grid = load_pixel_grid(&encode_png(40, 30, [1, 2, 3])).unwrap();
        assert_eq!((grid.width(), grid.height()), (40, 30));
    }

    #[test]
    fn test_large_image_fits_bound_and_keeps_aspect() {
        let grid = load_pixel_grid(&encode_png(1024, 512, [50, 60, 70])).unwrap();
        assert_eq!(grid.width(), 256);
        assert_eq!(grid.height(), 128);
    }

    #[test]
    fn test_tall_image_bounded_on_height() {
        let grid = load_pixel_grid(&encode_png(300, 600, [0, 0, 0])).unwrap();
        assert_eq!(grid.height(), 256);
        assert_eq!(grid.width(), 128);
    }

    #[test]
    fn test_grayscale_normalized_to_rgb() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(8, 8, image::Luma([77])));
        let mut buf = Vec::new();
        gray.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let grid = load_pixel_grid(&buf).unwrap();
        assert!(grid.pixels().iter().all(|p| *p == [77, 77, 77]));
    }
}
