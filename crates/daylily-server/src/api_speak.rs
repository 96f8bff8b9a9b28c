//! Text-to-speech endpoint.

use crate::{api::ApiError, middleware::SessionContext, AppState, LATENCY_HEADER};
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

/// Handler for `POST /speak`.
///
/// Returns the synthesised speech as an `audio/wav` body with the synthesis
/// time in `X-Latency`.
pub async fn speak_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(SessionContext(session_id)): Extension<SessionContext>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    tracing::info!(session_id = %session_id, chars = payload.text.len(), "speech requested");

    let speech = state.tts_service.synthesize(&payload.text).await?;

    let latency = HeaderValue::from_str(&speech.latency.to_string())
        .map_err(|e| ApiError::InternalServerError(format!("invalid latency header: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("audio/wav")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("inline; filename=\"speech.wav\""),
            ),
            (LATENCY_HEADER, latency),
        ],
        speech.wav,
    )
        .into_response())
}
