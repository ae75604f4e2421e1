//! # Analysis Pipelines
//!
//! The two public entry points, `classify_body` and `classify_meal`. Each is a
//! pure function of the image bytes and a language code:
//! bytes -> pixel grid -> features -> estimate -> category -> localized text.
//! Faults never escape; they are reported as a failure payload.

use std::time::Instant;

use serde::Serialize;

use crate::classifier::{BodyCategory, BodyEstimate, MealCategory, MealEstimate};
use crate::errors::{error_logging, AnalysisError};
use crate::features::{extract_body_features, extract_meal_features, round_to};
use crate::localization::{detect_language, t_args_lang, t_lang, Language};
use crate::observability;
use crate::preprocessing::load_pixel_grid;

/// HTTP-equivalent status of a failed analysis
pub const FAILURE_STATUS: u16 = 500;

/// Which pipeline produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Body,
    Meal,
}

impl Pipeline {
    pub fn as_str(self) -> &'static str {
        match self {
            Pipeline::Body => "body",
            Pipeline::Meal => "meal",
        }
    }

    fn failure_key(self) -> &'static str {
        match self {
            Pipeline::Body => "error-body-analysis",
            Pipeline::Meal => "error-meal-analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyAnalysis {
    pub success: bool,
    pub shape: String,
    pub body_fat: f64,
    pub muscle_mass: f64,
    pub bmi: f64,
    pub aspect_ratio: f64,
    pub advice: String,
    #[serde(skip)]
    pub category: BodyCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealAnalysis {
    pub success: bool,
    pub meal_name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
    pub advice: String,
    #[serde(skip)]
    pub category: MealCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisFailure {
    pub success: bool,
    pub message: String,
}

impl AnalysisFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Either a full result or a failure payload; never a partial result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome<T> {
    Success(T),
    Failure(AnalysisFailure),
}

impl<T> AnalysisOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisOutcome::Success(_) => 200,
            AnalysisOutcome::Failure(_) => FAILURE_STATUS,
        }
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            AnalysisOutcome::Success(value) => Some(value),
            AnalysisOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match self {
            AnalysisOutcome::Success(_) => None,
            AnalysisOutcome::Failure(failure) => Some(failure),
        }
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

/// Runs the body pipeline, propagating faults.
pub fn analyze_body(image_bytes: &[u8], language: Language) -> Result<BodyAnalysis, AnalysisError> {
    let grid = load_pixel_grid(image_bytes)?;
    let features = extract_body_features(&grid);
    let estimate = BodyEstimate::from_features(&features);

    tracing::debug!(
        target: "analysis",
        avg_luminance = features.avg_luminance_upper_half,
        relative_luminance = features.relative_luminance,
        body_fat_pct = estimate.body_fat_pct,
        category = estimate.category.as_str(),
        "Body features classified"
    );

    Ok(BodyAnalysis {
        success: true,
        shape: t_lang(estimate.category.label_key(), language)?,
        body_fat: round1(estimate.body_fat_pct),
        muscle_mass: round1(estimate.muscle_mass_pct),
        bmi: round1(estimate.bmi),
        aspect_ratio: estimate.aspect_ratio,
        advice: t_lang(estimate.category.advice().message_key(), language)?,
        category: estimate.category,
    })
}

/// Runs the meal pipeline, propagating faults.
pub fn analyze_meal(image_bytes: &[u8], language: Language) -> Result<MealAnalysis, AnalysisError> {
    let grid = load_pixel_grid(image_bytes)?;
    let features = extract_meal_features(&grid);
    let estimate = MealEstimate::from_features(&features);

    tracing::debug!(
        target: "analysis",
        yellow_score = features.yellow_score,
        green_score = features.green_score,
        brightness_norm = features.brightness_norm,
        category = estimate.category.as_str(),
        "Meal features classified"
    );

    let macros = estimate.macros;
    Ok(MealAnalysis {
        success: true,
        meal_name: t_lang(estimate.category.label_key(), language)?,
        calories: macros.calories,
        protein: macros.protein_g,
        carbs: macros.carbs_g,
        fats: macros.fats_g,
        advice: t_lang(estimate.category.advice_key(), language)?,
        category: estimate.category,
    })
}

fn run_pipeline<T, F>(
    pipeline: Pipeline,
    image_bytes: &[u8],
    language_code: Option<&str>,
    category_of: fn(&T) -> &'static str,
    analyze: F,
) -> AnalysisOutcome<T>
where
    F: FnOnce(&[u8], Language) -> Result<T, AnalysisError>,
{
    let language = detect_language(language_code);
    let span = observability::analysis_span(pipeline.as_str(), language.code());
    let _guard = span.enter();
    let start = Instant::now();

    let result = analyze(image_bytes, language);
    let duration = start.elapsed();

    match result {
        Ok(value) => {
            let category = category_of(&value);
            observability::record_analysis_metrics(
                pipeline.as_str(),
                Some(category),
                duration,
                image_bytes.len(),
            );
            tracing::info!(
                category = category,
                duration_ms = duration.as_millis() as u64,
                "Analysis completed"
            );
            AnalysisOutcome::Success(value)
        }
        Err(err) => {
            observability::record_analysis_metrics(pipeline.as_str(), None, duration, image_bytes.len());
            error_logging::log_analysis_error(
                &err,
                pipeline.as_str(),
                language.code(),
                Some(image_bytes.len()),
                Some(duration),
            );
            let detail = err.to_string();
            let message = t_args_lang(pipeline.failure_key(), &[("error", detail.as_str())], language)
                .unwrap_or(detail);
            AnalysisOutcome::Failure(AnalysisFailure::new(message))
        }
    }
}

/// Estimate body composition from a photo.
///
/// `language` is a language tag (`en`, `fr`, `ar`, optionally region
/// qualified); anything else resolves to English.
///
/// # Examples
///
/// ```
/// use bodytalk::analysis::classify_body;
///
/// let outcome = classify_body(b"not an image", Some("en"));
/// assert!(!outcome.is_success());
/// assert_eq!(outcome.status_code(), 500);
/// ```
pub fn classify_body(image_bytes: &[u8], language: Option<&str>) -> AnalysisOutcome<BodyAnalysis> {
    run_pipeline(
        Pipeline::Body,
        image_bytes,
        language,
        |result: &BodyAnalysis| result.category.as_str(),
        analyze_body,
    )
}

/// Estimate how calorie-dense a meal is from a photo.
pub fn classify_meal(image_bytes: &[u8], language: Option<&str>) -> AnalysisOutcome<MealAnalysis> {
    run_pipeline(
        Pipeline::Meal,
        image_bytes,
        language,
        |result: &MealAnalysis| result.category.as_str(),
        analyze_meal,
    )
}
