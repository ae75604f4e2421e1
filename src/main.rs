use anyhow::Result;
use bodytalk::config::AppConfig;
use bodytalk::errors::error_logging;
use bodytalk::localization;
use bodytalk::observability;
use bodytalk::server::{self, ApiState};
use tracing::info;

/// Load and validate configuration at startup
fn load_configuration() -> Result<AppConfig> {
    let config = AppConfig::from_env().map_err(|e| {
        anyhow::anyhow!("Failed to load configuration: {}. Please check your environment.", e)
    })?;

    config.validate().map_err(|e| {
        anyhow::anyhow!("Configuration validation failed: {}. Please check your configuration values.", e)
    })?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let config = load_configuration()?;

    // Initialize logging and metrics before anything else logs
    observability::init_observability_with_config(
        &config.observability,
        config.server.metrics_port,
    )
    .await?;
    info!("{}", config.summary());

    // Refuse to serve with an incomplete catalog
    if let Err(e) = localization::init_localization() {
        error_logging::log_config_error(&e, "locales", "init_localization");
        return Err(anyhow::anyhow!("Localization initialization failed: {}", e));
    }

    let listener = server::bind_api_server(&config.server).await?;
    let state = ApiState {
        analysis: config.analysis.clone(),
    };

    tokio::select! {
        result = server::serve(listener, state) => {
            result.map_err(|e| anyhow::anyhow!("Analysis API stopped: {}", e))?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping analysis API");
        }
    }

    Ok(())
}
