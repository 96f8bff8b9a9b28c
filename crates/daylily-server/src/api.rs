//! Shared API types and the service-level handlers.

use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use daylily_inference::InferenceError;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::UnsupportedFormat(_)
            | InferenceError::EmptyInput(_)
            | InferenceError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            InferenceError::TooLarge(_) => ApiError::PayloadTooLarge(err.to_string()),
            InferenceError::NotConfigured(_) => ApiError::ServiceUnavailable(err.to_string()),
            InferenceError::Conversion(_)
            | InferenceError::Stt(_)
            | InferenceError::Tts(_)
            | InferenceError::Avatar(_)
            | InferenceError::Io(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("invalid JSON body: {}", err.body_text()))
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("multipart error: {}", err.body_text()))
        }
    }
}

/// Handler for `GET /status`.
pub async fn status_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": state.sessions.active_count(),
    }))
}

/// Readiness of each inference engine.
#[derive(Debug, Serialize)]
pub struct WarmupResponse {
    pub stt: bool,
    pub tts: bool,
    pub avatar: bool,
}

/// Handler for `POST /warmup`.
///
/// Checks that every configured engine can be found on disk so the first
/// real request does not discover a missing binary. Always returns `200 OK`;
/// the body says which engines are usable.
pub async fn warmup_handler(Extension(state): Extension<Arc<AppState>>) -> Json<WarmupResponse> {
    let readiness = WarmupResponse {
        stt: ready("stt", state.stt_service.check_ready()),
        tts: ready("tts", state.tts_service.check_ready()),
        avatar: ready("avatar", state.avatar_service.check_ready()),
    };
    tracing::info!(?readiness, "warmup complete");
    Json(readiness)
}

fn ready(engine: &str, result: Result<(), InferenceError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(engine, "engine not ready: {}", e);
            false
        }
    }
}
