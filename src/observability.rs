//! Observability module for centralized metrics and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection and Prometheus export
//! - Liveness/readiness endpoints next to `/metrics`
//! - Span and metric helpers used by the analysis pipelines

use std::net::SocketAddr;

use anyhow::Result;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize logging and, when enabled, the metrics exporter and its server
/// on `metrics_port` (`ServerConfig::metrics_port`)
pub async fn init_observability_with_config(
    config: &ObservabilityConfig,
    metrics_port: u16,
) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing_with_config(config)?;

    if config.enable_metrics_export {
        let metrics_handle = init_metrics_with_config(config)?;
        start_metrics_server(metrics_handle, metrics_port).await?;
    } else {
        tracing::info!("Metrics export disabled");
    }

    tracing::info!(
        environment = %config.environment,
        metrics_port = %metrics_port,
        "Observability stack initialized successfully"
    );
    Ok(())
}

/// Initialize structured logging with tracing and configuration
fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("bodytalk={}", config.log_level).parse()?)
        .add_directive("hyper=warn".parse()?);

    if config.use_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Initialize metrics collection with Prometheus exporter
fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    tracing::info!(
        metrics_enabled = %config.enable_metrics_export,
        "Metrics collection initialized"
    );
    Ok(handle)
}

async fn start_metrics_server(metrics_handle: PrometheusHandle, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on {}", addr);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let metrics_handle = metrics_handle.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = hyper::service::service_fn(
                            move |req: hyper::Request<hyper::body::Incoming>| {
                                let metrics_handle = metrics_handle.clone();
                                async move {
                                    Ok::<_, std::convert::Infallible>(metrics_response(
                                        req.method(),
                                        req.uri().path(),
                                        &metrics_handle,
                                    ))
                                }
                            },
                        );

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await
                        {
                            tracing::error!("Error serving metrics connection: {:?}", err);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Error accepting metrics connection: {}", e);
                }
            }
        }
    });

    Ok(())
}

fn metrics_response(
    method: &hyper::Method,
    path: &str,
    metrics_handle: &PrometheusHandle,
) -> hyper::Response<String> {
    match (method, path) {
        (&hyper::Method::GET, "/metrics") => {
            let mut response = hyper::Response::new(metrics_handle.render());
            response.headers_mut().insert(
                "content-type",
                hyper::header::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
            );
            response
        }
        (&hyper::Method::GET, "/health/live") => hyper::Response::new("OK".to_string()),
        (&hyper::Method::GET, "/health/ready") => match check_readiness() {
            Ok(()) => hyper::Response::new("OK".to_string()),
            Err(e) => {
                let mut response = hyper::Response::new(format!("NOT READY: {}", e));
                *response.status_mut() = hyper::StatusCode::SERVICE_UNAVAILABLE;
                response
            }
        },
        _ => {
            let mut response = hyper::Response::new("Not Found".to_string());
            *response.status_mut() = hyper::StatusCode::NOT_FOUND;
            response
        }
    }
}

/// Ready once every catalog entry resolves
pub fn check_readiness() -> Result<()> {
    crate::localization::localization_manager()
        .verify()
        .map_err(|e| anyhow::anyhow!("Localization check failed: {}", e))
}

/// Create a span for an analysis run
pub fn analysis_span(pipeline: &str, language: &str) -> tracing::Span {
    tracing::info_span!(
        "analysis_operation",
        pipeline = pipeline,
        language = language,
        component = "analysis"
    )
}

/// Create a span for an HTTP request
pub fn request_span(method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("http_request", method = method, path = path, component = "api")
}

/// Record analysis metrics. `category` is `None` for failed runs.
pub fn record_analysis_metrics(
    pipeline: &str,
    category: Option<&str>,
    duration: std::time::Duration,
    image_size: usize,
) {
    let pipeline = pipeline.to_string();
    let result = if category.is_some() { "success" } else { "failure" };
    metrics::counter!("analysis_operations_total", "pipeline" => pipeline.clone(), "result" => result)
        .increment(1);
    metrics::histogram!("analysis_duration_seconds", "pipeline" => pipeline.clone())
        .record(duration.as_secs_f64());
    metrics::histogram!("analysis_image_size_bytes").record(image_size as f64);
    if let Some(category) = category {
        let category = category.to_string();
        metrics::counter!("analysis_category_total", "pipeline" => pipeline, "category" => category)
            .increment(1);
    }
}

/// Record request metrics
pub fn record_request_metrics(method: &str, status: u16, duration: std::time::Duration) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("requests_total", "method" => method, "status" => status).increment(1);
    metrics::histogram!("request_duration_seconds").record(duration.as_secs_f64());
}
