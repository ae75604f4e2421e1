//! # Observability Configuration
//!
//! Environment-specific settings for logging and metrics export.

use std::env;
use std::fmt;
use std::str::FromStr;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    Json,
    /// Multi-line human readable output
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("Invalid log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Logging and metrics settings. The metrics server port lives in
/// `ServerConfig` next to the API port.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Deployment name: development, staging, production, ...
    pub environment: String,
    /// Level applied to the `bodytalk` target
    pub log_level: String,
    pub log_format: LogFormat,
    /// Install the Prometheus recorder and start its server
    pub enable_metrics_export: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            enable_metrics_export: true,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables.
    ///
    /// `ENVIRONMENT` picks the preset; the other variables override it.
    /// Unparseable values keep the preset's value.
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let base = presets::for_environment(&environment);
        Self {
            log_level: env::var("OBSERVABILITY_LOG_LEVEL")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or(base.log_level),
            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.log_format),
            enable_metrics_export: env::var("ENABLE_METRICS_EXPORT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(base.enable_metrics_export),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Pretty output in development unless production forces JSON
    pub fn use_pretty_logs(&self) -> bool {
        !self.is_production() && (self.is_development() || self.log_format == LogFormat::Pretty)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!("Invalid log level: {}", self.log_level));
        }
        Ok(())
    }
}

/// Environment-specific configuration presets
pub mod presets {
    use super::{LogFormat, ObservabilityConfig};

    pub fn development() -> ObservabilityConfig {
        ObservabilityConfig {
            log_level: "debug".to_string(),
            log_format: LogFormat::Pretty,
            ..Default::default()
        }
    }

    pub fn production() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "production".to_string(),
            ..Default::default()
        }
    }

    /// Errors only, no metrics server
    pub fn minimal() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "minimal".to_string(),
            log_level: "error".to_string(),
            enable_metrics_export: false,
            ..Default::default()
        }
    }

    /// Preset for an `ENVIRONMENT` name; unknown names get the defaults
    pub fn for_environment(environment: &str) -> ObservabilityConfig {
        match environment {
            "development" => development(),
            "production" => production(),
            "minimal" => minimal(),
            other => ObservabilityConfig {
                environment: other.to_string(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.enable_metrics_export);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ObservabilityConfig::default();

        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
        config.log_level = "warn".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = presets::development();
        assert!(dev.is_development());
        assert!(dev.use_pretty_logs());

        let prod = presets::production();
        assert!(prod.is_production());
        assert!(!prod.use_pretty_logs());

        let prod_pretty = ObservabilityConfig {
            log_format: LogFormat::Pretty,
            ..presets::production()
        };
        assert!(!prod_pretty.use_pretty_logs());

        let staging = presets::for_environment("staging");
        assert_eq!(staging.environment, "staging");
        assert_eq!(staging.log_level, "info");
        assert_eq!(presets::for_environment("minimal").log_level, "error");
        assert_eq!(presets::for_environment("development").log_format, LogFormat::Pretty);

        let minimal = presets::minimal();
        assert!(!minimal.enable_metrics_export);
        assert!(!minimal.use_pretty_logs());
        assert!(minimal.validate().is_ok());
    }
}
