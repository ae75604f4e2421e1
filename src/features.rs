//! # Feature Extraction
//!
//! Aggregate pixel statistics feeding the body and meal classifiers. Every
//! normalized score is clamped to `[0.0, 1.0]`; the offsets and divisors below
//! are fixed calibration constants and changing them changes every result.

use serde::Serialize;

use crate::errors::AnalysisError;
use crate::preprocessing::PixelGrid;

/// Luminance treated as "dark" (maps to 0.0).
pub const LUMINANCE_DARK: f64 = 80.0;
/// Luminance treated as "very light" (maps to 1.0).
pub const LUMINANCE_LIGHT: f64 = 210.0;

pub const YELLOW_SCALE: f64 = 90.0;
pub const GREEN_OFFSET: f64 = 20.0;
pub const GREEN_SCALE: f64 = 140.0;
pub const BRIGHTNESS_OFFSET: f64 = 60.0;
pub const BRIGHTNESS_SCALE: f64 = 210.0;

/// Statistics of the upper half of a photo, used as a torso/shoulder proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyFeatures {
    /// Mean of `(R+G+B)/3` over rows `0..height/2`, in `0..=255`
    pub avg_luminance_upper_half: f64,
    /// `avg_luminance_upper_half` rescaled from `[80, 210]` to `[0, 1]`
    pub relative_luminance: f64,
    /// `height / width` of the whole grid, 3 decimals; 1.0 when width is 0
    pub aspect_ratio: f64,
}

/// Whole-image color statistics used to guess how calorie-dense a meal is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MealFeatures {
    pub avg_red: f64,
    pub avg_green: f64,
    pub avg_blue: f64,
    pub avg_brightness: f64,
    /// Positive when warm yellow/orange tones dominate (fried or starchy food)
    pub yellow_level: f64,
    /// Positive when green dominates (vegetables)
    pub green_level: f64,
    pub yellow_score: f64,
    pub green_score: f64,
    pub brightness_norm: f64,
}

/// Clamps a score into `[0.0, 1.0]`. NaN collapses to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    value.max(0.0).min(1.0)
}

/// Rounds to `decimals` places using the exact binary value, ties to even.
///
/// `f64::round` scales first and breaks ties away from zero, so `1.0625`
/// would become `1.063`. Float formatting rounds the exact value instead.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

fn warn_if_degenerate(grid: &PixelGrid, pipeline: &str) {
    if grid.width() == 0 || grid.height() == 0 {
        let error = AnalysisError::DegenerateInput {
            width: grid.width(),
            height: grid.height(),
        };
        tracing::warn!(
            target: "analysis_features",
            error = %error,
            pipeline = %pipeline,
            "Degenerate image, using fallback statistics"
        );
    }
}

/// Mean of per-pixel `(R+G+B)/3`; `None` for an empty region.
fn mean_luminance(pixels: &[[u8; 3]]) -> Option<f64> {
    if pixels.is_empty() {
        return None;
    }
    let sum: u64 = pixels
        .iter()
        .map(|p| p[0] as u64 + p[1] as u64 + p[2] as u64)
        .sum();
    Some(sum as f64 / 3.0 / pixels.len() as f64)
}

/// Per-channel means; `None` for an empty region.
fn mean_channels(pixels: &[[u8; 3]]) -> Option<[f64; 3]> {
    if pixels.is_empty() {
        return None;
    }
    let mut sums = [0u64; 3];
    for p in pixels {
        sums[0] += p[0] as u64;
        sums[1] += p[1] as u64;
        sums[2] += p[2] as u64;
    }
    let n = pixels.len() as f64;
    Some([sums[0] as f64 / n, sums[1] as f64 / n, sums[2] as f64 / n])
}

/// Maps mean luminance onto `[0, 1]`, saturating outside `[80, 210]`.
pub fn relative_luminance(avg_luminance: f64) -> f64 {
    clamp_unit((avg_luminance - LUMINANCE_DARK) / (LUMINANCE_LIGHT - LUMINANCE_DARK))
}

/// Extracts the body pipeline features.
///
/// An empty upper region (zero-sized grid or a single row) contributes a
/// mean luminance of 0.0 rather than failing.
pub fn extract_body_features(grid: &PixelGrid) -> BodyFeatures {
    warn_if_degenerate(grid, "body");

    let aspect_ratio = if grid.width() > 0 {
        round_to(grid.height() as f64 / grid.width() as f64, 3)
    } else {
        1.0
    };

    let upper = grid.top_rows(grid.height() / 2);
    let avg_luminance_upper_half = mean_luminance(upper).unwrap_or(0.0);

    BodyFeatures {
        avg_luminance_upper_half,
        relative_luminance: relative_luminance(avg_luminance_upper_half),
        aspect_ratio,
    }
}

/// Extracts the meal pipeline features over the full grid.
pub fn extract_meal_features(grid: &PixelGrid) -> MealFeatures {
    warn_if_degenerate(grid, "meal");

    let [avg_red, avg_green, avg_blue] = mean_channels(grid.pixels()).unwrap_or([0.0; 3]);
    let avg_brightness = (avg_red + avg_green + avg_blue) / 3.0;

    let yellow_level = (avg_red + avg_green) / 2.0 - avg_blue;
    let green_level = avg_green - avg_red.max(avg_blue);

    MealFeatures {
        avg_red,
        avg_green,
        avg_blue,
        avg_brightness,
        yellow_level,
        green_level,
        yellow_score: clamp_unit(yellow_level / YELLOW_SCALE),
        green_score: clamp_unit((green_level + GREEN_OFFSET) / GREEN_SCALE),
        brightness_norm: clamp_unit((avg_brightness - BRIGHTNESS_OFFSET) / BRIGHTNESS_SCALE),
    }
}
