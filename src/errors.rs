//! # Application Error Types
//!
//! This module defines the error types used throughout the BodyTalk service.
//! `AnalysisError` covers faults raised inside the image-statistics engine,
//! `AppError` covers the service around it (configuration, uploads, network).

use std::fmt;

/// Faults raised while turning image bytes into a classification
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The uploaded bytes are not a decodable image
    Decode { message: String },
    /// The pixel grid has a zero dimension; analysis continues on fixed fallbacks
    DegenerateInput { width: u32, height: u32 },
    /// A category or advice key has no entry for a supported language
    LocalizationGap { key: String, language: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Decode { message } => {
                write!(f, "[DECODE] Failed to decode image: {}", message)
            }
            AnalysisError::DegenerateInput { width, height } => {
                write!(
                    f,
                    "[DEGENERATE] Image has a zero dimension: {}x{}",
                    width, height
                )
            }
            AnalysisError::LocalizationGap { key, language } => {
                write!(
                    f,
                    "[LOCALIZATION] Missing translation '{}' for language '{}'",
                    key, language
                )
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<image::ImageError> for AnalysisError {
    fn from(err: image::ImageError) -> Self {
        AnalysisError::Decode {
            message: err.to_string(),
        }
    }
}

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Image analysis errors
    Analysis(AnalysisError),
    /// Network/communication errors
    Network(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Analysis(err) => write!(f, "[ANALYSIS] {}", err),
            AppError::Network(msg) => write!(f, "[NETWORK] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log image analysis failures with pipeline and upload context
    pub fn log_analysis_error(
        error: &impl std::fmt::Display,
        pipeline: &str,
        language: &str,
        image_size: Option<usize>,
        processing_duration: Option<std::time::Duration>,
    ) {
        error!(
            error = %error,
            pipeline = %pipeline,
            language = %language,
            image_size_bytes = ?image_size,
            processing_duration_ms = ?processing_duration.map(|d| d.as_millis()),
            "Image analysis failed"
        );
    }

    /// Log network/communication errors with connection context
    pub fn log_network_error(
        error: &impl std::fmt::Display,
        operation: &str,
        endpoint: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            endpoint = ?endpoint,
            "Network operation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
