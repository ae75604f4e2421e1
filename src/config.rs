//! # Unified Application Configuration
//!
//! This module consolidates all service settings into a single, structured
//! configuration object loaded from environment variables (and `.env` files,
//! which `main` reads with `dotenvy` before calling [`AppConfig::from_env`]).

use std::env;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;

/// Smallest accepted upload limit
const MIN_UPLOAD_BYTES: usize = 1024;
/// Largest accepted upload limit
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface the analysis API binds to
    pub host: IpAddr,
    /// Analysis API port
    pub api_port: u16,
    /// Metrics server port
    pub metrics_port: u16,
    /// Whether to allow privileged ports (< 1024)
    pub allow_privileged_ports: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            api_port: 8000,
            metrics_port: 9090,
            allow_privileged_ports: false,
        }
    }
}

impl ServerConfig {
    /// Ports must be distinct, non-zero, and unprivileged unless allowed
    pub fn validate(&self) -> AppResult<()> {
        for (name, port) in [("API", self.api_port), ("Metrics", self.metrics_port)] {
            if port == 0 {
                return Err(AppError::Config(format!("{} port cannot be 0", name)));
            }
            if port < 1024 && !self.allow_privileged_ports {
                return Err(AppError::Config(format!(
                    "{} port {} needs ALLOW_PRIVILEGED_PORTS=true (or use a port >= 1024)",
                    name, port
                )));
            }
        }

        if self.api_port == self.metrics_port {
            return Err(AppError::Config(format!(
                "API and metrics servers cannot share port {}",
                self.api_port
            )));
        }

        Ok(())
    }

    /// Socket address of the analysis API
    pub fn api_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.api_port)
    }
}

/// Analysis request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl AnalysisConfig {
    /// Validate analysis configuration
    pub fn validate(&self) -> AppResult<()> {
        if !(MIN_UPLOAD_BYTES..=MAX_UPLOAD_BYTES).contains(&self.max_upload_bytes) {
            return Err(AppError::Config(format!(
                "Max upload size must be between {} and {} bytes, got {}",
                MIN_UPLOAD_BYTES, MAX_UPLOAD_BYTES, self.max_upload_bytes
            )));
        }
        Ok(())
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Analysis configuration
    pub analysis: AnalysisConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: &str, what: &str) -> AppResult<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be {}", key, what)))
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        // Load server configuration
        config.server.host = env_or("API_HOST", "0.0.0.0", "a valid IP address")?;
        config.server.api_port = env_or("API_PORT", "8000", "a valid port number")?;
        config.server.metrics_port = env_or("METRICS_PORT", "9090", "a valid port number")?;
        config.server.allow_privileged_ports = env::var("ALLOW_PRIVILEGED_PORTS")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        // Load analysis configuration
        config.analysis.max_upload_bytes =
            env_or("MAX_UPLOAD_BYTES", "10485760", "a valid number of bytes")?;

        // Load observability configuration
        config.observability = ObservabilityConfig::from_env();

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.server.validate()?;
        self.analysis.validate()?;
        self.observability.validate().map_err(AppError::Config)?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: api_addr={}, metrics_port={}, max_upload_bytes={}, environment={}, metrics_enabled={}",
            self.server.api_addr(),
            self.server.metrics_port,
            self.analysis.max_upload_bytes,
            self.observability.environment,
            self.observability.enable_metrics_export
        )
    }
}
