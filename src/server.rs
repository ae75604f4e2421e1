//! # Analysis HTTP API
//!
//! A small hyper server in front of the two pipelines. The request body is
//! the encoded image; the display language comes from the `lang` query
//! parameter or the `Accept-Language` header.
//!
//! Routes:
//! - `GET /`, `GET /health`
//! - `POST /analyze`, `POST /analyze_body_image`, `POST /analyze/body`
//! - `POST /analyze_food`, `POST /analyze/food`

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::{Body as _, Incoming};
use hyper::header::{HeaderMap, HeaderValue};
use hyper::server::conn::http1;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::analysis::{classify_body, classify_meal, AnalysisFailure, Pipeline};
use crate::config::{AnalysisConfig, ServerConfig};
use crate::errors::{error_logging, AppResult};
use crate::localization::{detect_language, t_lang};
use crate::observability;
use crate::validation::{error_message_key, validate_upload};

const BODY_ROUTES: [&str; 3] = ["/analyze", "/analyze_body_image", "/analyze/body"];
const MEAL_ROUTES: [&str; 2] = ["/analyze_food", "/analyze/food"];

/// Shared, read-only request handling state
#[derive(Debug, Clone, Default)]
pub struct ApiState {
    pub analysis: AnalysisConfig,
}

/// Why a request body could not be read
#[derive(Debug)]
enum BodyError {
    TooLarge,
    Read(String),
}

/// Bind the API listener
pub async fn bind_api_server(config: &ServerConfig) -> AppResult<TcpListener> {
    let addr = config.api_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Analysis API listening on {}", addr);
    Ok(listener)
}

/// Accept connections until the listener fails
pub async fn serve(listener: TcpListener, state: ApiState) -> AppResult<()> {
    let state = Arc::new(state);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = state.clone();

                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let state = state.clone();
                        async move { Ok::<_, Infallible>(handle(req, &state).await) }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::error!(peer = %peer, "Error serving connection: {:?}", err);
                    }
                });
            }
            Err(e) => {
                error_logging::log_network_error(&e, "accept_connection", None);
            }
        }
    }
}

async fn handle(req: Request<Incoming>, state: &ApiState) -> Response<String> {
    let start = Instant::now();
    let (parts, body) = req.into_parts();
    let span = observability::request_span(parts.method.as_str(), parts.uri.path());

    async move {
        let language = request_language(&parts.uri, &parts.headers);
        let limit = state.analysis.max_upload_bytes;

        let response = if declared_length(&parts.headers).is_some_and(|len| len > limit) {
            validation_failure("upload-too-large", language.as_deref())
        } else if parts.method == Method::POST {
            match read_body(body, limit).await {
                Ok(bytes) => {
                    route(state, &parts.method, parts.uri.path(), language.as_deref(), bytes).await
                }
                Err(err) => body_error_response(&err, parts.uri.path(), language.as_deref()),
            }
        } else {
            route(state, &parts.method, parts.uri.path(), language.as_deref(), Vec::new()).await
        };

        let status = response.status().as_u16();
        observability::record_request_metrics(parts.method.as_str(), status, start.elapsed());
        tracing::info!(status = status, duration_ms = start.elapsed().as_millis() as u64, "Request handled");
        response
    }
    .instrument(span)
    .await
}

/// Dispatch a request whose body has already been read.
pub async fn route(
    state: &ApiState,
    method: &Method,
    path: &str,
    language: Option<&str>,
    body: Vec<u8>,
) -> Response<String> {
    if method == Method::OPTIONS {
        let mut response = Response::new(String::new());
        *response.status_mut() = StatusCode::NO_CONTENT;
        add_cors_headers(response.headers_mut());
        response
            .headers_mut()
            .insert("access-control-allow-methods", HeaderValue::from_static("GET, POST, OPTIONS"));
        response
            .headers_mut()
            .insert("access-control-allow-headers", HeaderValue::from_static("*"));
        return response;
    }

    let pipeline = if BODY_ROUTES.contains(&path) {
        Some(Pipeline::Body)
    } else if MEAL_ROUTES.contains(&path) {
        Some(Pipeline::Meal)
    } else {
        None
    };

    match (method, path, pipeline) {
        (&Method::GET, "/", _) => {
            let lang = detect_language(language);
            let message = t_lang("server-running", lang)
                .unwrap_or_else(|_| "BodyTalk AI server is running".to_string());
            json_response(StatusCode::OK, &serde_json::json!({ "message": message }))
        }
        (&Method::GET, "/health", _) => {
            json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
        }
        (&Method::POST, _, Some(pipeline)) => analyze(state, pipeline, language, body).await,
        (_, _, Some(_)) => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &AnalysisFailure::new("Method Not Allowed"),
        ),
        _ => json_response(StatusCode::NOT_FOUND, &AnalysisFailure::new("Not Found")),
    }
}

async fn analyze(
    state: &ApiState,
    pipeline: Pipeline,
    language: Option<&str>,
    body: Vec<u8>,
) -> Response<String> {
    if let Err(key) = validate_upload(&body, state.analysis.max_upload_bytes) {
        return validation_failure(key, language);
    }

    let language = language.map(str::to_string);
    // Decoding and pixel statistics are CPU bound
    let joined = tokio::task::spawn_blocking(move || match pipeline {
        Pipeline::Body => {
            let outcome = classify_body(&body, language.as_deref());
            (outcome.status_code(), serde_json::to_value(outcome))
        }
        Pipeline::Meal => {
            let outcome = classify_meal(&body, language.as_deref());
            (outcome.status_code(), serde_json::to_value(outcome))
        }
    })
    .await;

    match joined {
        Ok((status, Ok(value))) => json_response(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            &value,
        ),
        Ok((_, Err(e))) => internal_failure(&e),
        Err(e) => internal_failure(&e),
    }
}

fn internal_failure(error: &impl std::fmt::Display) -> Response<String> {
    tracing::error!(error = %error, "Analysis task failed");
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &AnalysisFailure::new("Internal server error"),
    )
}

fn body_error_response(error: &BodyError, path: &str, language: Option<&str>) -> Response<String> {
    match error {
        BodyError::TooLarge => validation_failure("upload-too-large", language),
        BodyError::Read(e) => {
            error_logging::log_network_error(e, "read_request_body", Some(path));
            validation_failure("upload-unreadable", language)
        }
    }
}

fn validation_failure(key: &str, language: Option<&str>) -> Response<String> {
    let message_key = error_message_key(key);
    let message = t_lang(&message_key, detect_language(language)).unwrap_or(message_key);
    json_response(StatusCode::BAD_REQUEST, &AnalysisFailure::new(message))
}

fn json_response(status: StatusCode, value: &impl Serialize) -> Response<String> {
    let (status, body) = match serde_json::to_string(value) {
        Ok(body) => (status, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"success":false,"message":"Internal server error"}"#.to_string(),
            )
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    add_cors_headers(response.headers_mut());
    response
}

fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
}

/// Language from `?lang=`, then the first `Accept-Language` tag.
pub fn request_language(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    let from_query = uri.query().and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "lang")
            .map(|(_, value)| value.to_string())
    });

    from_query.or_else(|| {
        headers
            .get("accept-language")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|tag| tag.split(';').next().unwrap_or(tag).trim().to_string())
            .filter(|tag| !tag.is_empty())
    })
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

async fn read_body(body: Incoming, limit: usize) -> Result<Vec<u8>, BodyError> {
    let mut body = std::pin::pin!(body);
    let mut buf = Vec::new();

    while let Some(frame) = std::future::poll_fn(|cx| body.as_mut().poll_frame(cx)).await {
        let frame = frame.map_err(|e| BodyError::Read(e.to_string()))?;
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > limit {
                return Err(BodyError::TooLarge);
            }
            buf.extend_from_slice(&data);
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_language_prefers_query() {
        let uri: Uri = "/analyze/body?x=1&lang=fr".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("accept-language", HeaderValue::from_static("ar"));
        assert_eq!(request_language(&uri, &headers).as_deref(), Some("fr"));
    }

    #[test]
    fn test_request_language_from_header() {
        let uri: Uri = "/analyze/body".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "accept-language",
            HeaderValue::from_static("ar-SA;q=0.9, en;q=0.8"),
        );
        assert_eq!(request_language(&uri, &headers).as_deref(), Some("ar-SA"));
    }

    #[test]
    fn test_request_language_absent() {
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(request_language(&uri, &HeaderMap::new()), None);
    }

    #[test]
    fn test_declared_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);
        headers.insert("content-length", HeaderValue::from_static("512"));
        assert_eq!(declared_length(&headers), Some(512));
    }

    #[test]
    fn test_body_errors_have_their_own_messages() {
        crate::localization::init_localization().unwrap();

        let read_error = BodyError::Read("connection reset".to_string());
        let response = body_error_response(&read_error, "/analyze", Some("en"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body(),
            r#"{"success":false,"message":"The upload could not be read completely."}"#
        );

        let response = body_error_response(&BodyError::TooLarge, "/analyze", Some("en"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.body().contains("too large"));
    }

    #[test]
    fn test_json_response_headers() {
        let response = json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}));
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.body(), r#"{"status":"ok"}"#);
    }
}
