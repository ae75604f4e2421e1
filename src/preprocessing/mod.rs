//! # Image Preprocessing Module
//!
//! Decodes uploaded photos and reduces them to a bounded RGB pixel grid.
//!
//! The module is organized into focused sub-modules:
//! - `scaling`: decoding, color normalization and downsampling
//! - `types`: the `PixelGrid` shared with feature extraction

pub mod scaling;
pub mod types;

pub use scaling::{decode_image, downsample, load_pixel_grid, MAX_DIMENSION};
pub use types::PixelGrid;
