//! # Analysis Pipeline Tests
//!
//! End-to-end checks of `classify_body` and `classify_meal` on encoded
//! synthetic photos.

mod test_helpers;

use bodytalk::{classify_body, classify_meal, AnalysisOutcome, BodyCategory, MealCategory};
use image::ImageFormat;
use test_helpers::*;

fn body_ok(bytes: &[u8], lang: Option<&str>) -> bodytalk::BodyAnalysis {
    match classify_body(bytes, lang) {
        AnalysisOutcome::Success(result) => result,
        AnalysisOutcome::Failure(f) => panic!("body analysis failed: {}", f.message),
    }
}

fn meal_ok(bytes: &[u8], lang: Option<&str>) -> bodytalk::MealAnalysis {
    match classify_meal(bytes, lang) {
        AnalysisOutcome::Success(result) => result,
        AnalysisOutcome::Failure(f) => panic!("meal analysis failed: {}", f.message),
    }
}

#[test]
fn test_black_upper_half_is_very_athletic() {
    let result = body_ok(&split_png(40, 60, [0, 0, 0], [255, 255, 255]), Some("en"));
    assert!(result.success);
    assert_eq!(result.category, BodyCategory::VeryAthletic);
    assert_eq!(result.body_fat, 12.0);
    assert_eq!(result.muscle_mass, 50.0);
    assert_eq!(result.bmi, 20.0);
    assert_eq!(result.aspect_ratio, 1.5);
    assert_eq!(result.shape, "Very athletic");
    assert!(result.advice.starts_with("Your body shows a good athletic level"));
}

#[test]
fn test_bright_upper_half_is_high_fat() {
    let result = body_ok(&split_png(40, 40, [255, 255, 255], [0, 0, 0]), None);
    assert_eq!(result.category, BodyCategory::HighFat);
    assert_eq!(result.body_fat, 28.0);
    assert_eq!(result.muscle_mass, 30.0);
    assert_eq!(result.bmi, 30.0);
    assert_eq!(result.aspect_ratio, 1.0);
}

#[test]
fn test_mid_gray_is_balanced() {
    let result = body_ok(&gray_png(145), Some("en"));
    assert_eq!(result.category, BodyCategory::Balanced);
    assert_eq!(result.body_fat, 20.0);
    assert_eq!(result.muscle_mass, 40.0);
    assert_eq!(result.bmi, 25.0);
}

#[test]
fn test_gray_levels_map_to_expected_bands() {
    let athletic = body_ok(&gray_png(106), Some("en"));
    assert_eq!(athletic.category, BodyCategory::Athletic);
    assert_eq!(athletic.body_fat, 15.2);
    assert_eq!(athletic.muscle_mass, 46.0);
    assert_eq!(athletic.bmi, 22.0);
    // Both athletic bands share the same advice
    assert_eq!(
        athletic.advice,
        body_ok(&gray_png(0), Some("en")).advice
    );

    let full = body_ok(&gray_png(190), Some("en"));
    assert_eq!(full.category, BodyCategory::Full);
    assert_eq!(full.body_fat, 25.5);
    assert_eq!(full.muscle_mass, 33.1);
    assert_eq!(full.bmi, 28.5);
}

#[test]
fn test_exact_ties_round_to_even() {
    let result = body_ok(&uniform_png(16, 17, [0, 0, 0]), Some("en"));
    assert_eq!(result.aspect_ratio, 1.062);

    // Upper-half mean luminance 83.25 puts bmi at exactly 20.25
    let levels = [83u8, 83, 83, 84];
    let bytes = encode_with(1, 8, ImageFormat::Png, |_, y| {
        let level = levels.get(y as usize).copied().unwrap_or(255);
        [level, level, level]
    });
    let result = body_ok(&bytes, Some("en"));
    assert_eq!(result.bmi, 20.2);
    assert_eq!(result.body_fat, 12.4);
    assert_eq!(result.aspect_ratio, 8.0);
}

#[test]
fn test_body_ranges_hold_for_every_gray_level() {
    for level in (0..=255u16).step_by(5) {
        let result = body_ok(&gray_png(level as u8), Some("en"));
        assert!((12.0..=28.0).contains(&result.body_fat), "level {}", level);
        assert!((30.0..=50.0).contains(&result.muscle_mass), "level {}", level);
        assert!((20.0..=30.0).contains(&result.bmi), "level {}", level);
    }
}

#[test]
fn test_white_meal_is_moderate() {
    let result = meal_ok(&uniform_png(20, 20, [255, 255, 255]), Some("en"));
    assert_eq!(result.category, MealCategory::Moderate);
    assert_eq!(result.calories, 550);
    assert_eq!(result.protein, 25);
    assert_eq!(result.carbs, 60);
    assert_eq!(result.fats, 18);
    assert_eq!(result.meal_name, "Moderate-calorie meal");
}

#[test]
fn test_pure_green_meal_is_moderate() {
    let result = meal_ok(&uniform_png(20, 20, [0, 255, 0]), Some("en"));
    assert_eq!(result.category, MealCategory::Moderate);
    assert_eq!(result.calories, 550);
}

#[test]
fn test_warm_bright_meal_is_high_calorie() {
    let result = meal_ok(&uniform_png(20, 20, [230, 180, 40]), Some("en"));
    assert_eq!(result.category, MealCategory::HighCal);
    assert_eq!(result.calories, 800);
    assert_eq!(result.protein, 30);
    assert_eq!(result.carbs, 95);
    assert_eq!(result.fats, 40);
}

#[test]
fn test_green_dominant_meal_is_light() {
    let result = meal_ok(&uniform_png(20, 20, [0, 200, 120]), Some("en"));
    assert_eq!(result.category, MealCategory::Light);
    assert_eq!(result.calories, 280);
    assert_eq!(result.protein, 10);
    assert_eq!(result.carbs, 30);
    assert_eq!(result.fats, 8);
}

#[test]
fn test_meal_is_deterministic() {
    let bytes = encode_with(64, 64, ImageFormat::Png, |x, y| {
        [(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8]
    });
    let first = classify_meal(&bytes, Some("fr"));
    let second = classify_meal(&bytes, Some("fr"));
    assert_eq!(first, second);
}

#[test]
fn test_unsupported_language_matches_english() {
    let bytes = gray_png(170);
    let german = serde_json::to_string(&classify_body(&bytes, Some("de"))).unwrap();
    let english = serde_json::to_string(&classify_body(&bytes, Some("en"))).unwrap();
    assert_eq!(german, english);

    let bytes = uniform_png(10, 10, [230, 180, 40]);
    assert_eq!(classify_meal(&bytes, Some("de")), classify_meal(&bytes, Some("en")));
    assert_eq!(classify_meal(&bytes, None), classify_meal(&bytes, Some("en")));
}

#[test]
fn test_localized_labels() {
    let bytes = gray_png(0);
    assert_eq!(body_ok(&bytes, Some("fr")).shape, "Très athlétique");
    assert_eq!(body_ok(&bytes, Some("ar")).shape, "رياضي جدًا");
    assert_eq!(body_ok(&bytes, Some("ar-EG")).shape, "رياضي جدًا");

    let meal = uniform_png(10, 10, [0, 200, 120]);
    assert_eq!(meal_ok(&meal, Some("fr")).meal_name, "Repas plutôt léger");
    assert_eq!(meal_ok(&meal, Some("ar")).meal_name, "وجبة خفيفة نسبيًا");
}

#[test]
fn test_undecodable_bytes_fail_cleanly() {
    let outcome = classify_body(&truncated_png(), Some("en"));
    assert_eq!(outcome.status_code(), 500);
    let failure = outcome.failure().expect("expected failure");
    assert!(!failure.success);
    assert!(failure
        .message
        .starts_with("An error occurred while analyzing the body:"));

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert!(json.get("body_fat").is_none());
}

#[test]
fn test_large_upload_is_downsampled() {
    let bytes = split_png(1000, 600, [0, 0, 0], [255, 255, 255]);
    let result = body_ok(&bytes, Some("en"));
    assert!((result.aspect_ratio - 0.6).abs() < 0.01);
    assert_eq!(result.category, BodyCategory::VeryAthletic);
}

#[test]
fn test_jpeg_upload_is_accepted() {
    let bytes = encode_with(48, 48, ImageFormat::Jpeg, |_, _| [0, 0, 0]);
    let result = body_ok(&bytes, Some("en"));
    assert_eq!(result.category, BodyCategory::VeryAthletic);
}

#[test]
fn test_success_payload_shape() {
    let outcome = classify_body(&gray_png(145), Some("en"));
    let json = serde_json::to_value(&outcome).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    for key in ["success", "shape", "body_fat", "muscle_mass", "bmi", "aspect_ratio", "advice"] {
        assert!(keys.contains(&key), "missing {}", key);
    }
    assert_eq!(keys.len(), 7);
}
