//! # BodyTalk
//!
//! Estimates a coarse body-composition class or meal calorie class from
//! aggregate pixel statistics of a photo, with advice in English, French or
//! Arabic. The classification is a deterministic, hand-tuned heuristic: no
//! model, no training.
//!
//! ```
//! use bodytalk::{classify_meal, AnalysisOutcome};
//!
//! let outcome = classify_meal(b"\x89PNG but truncated", Some("ar"));
//! assert!(matches!(outcome, AnalysisOutcome::Failure(_)));
//! ```

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod features;
pub mod localization;
pub mod observability;
pub mod observability_config;
pub mod preprocessing;
pub mod server;
pub mod validation;

// Re-export types for easier access
pub use analysis::{
    classify_body, classify_meal, AnalysisFailure, AnalysisOutcome, BodyAnalysis, MealAnalysis,
};
pub use classifier::{BodyCategory, MealCategory};
pub use errors::{AnalysisError, AppError, AppResult};
pub use localization::Language;
