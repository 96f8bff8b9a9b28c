//! Speech-to-text endpoint.

use crate::{api::ApiError, middleware::SessionContext, AppState};
use axum::{
    extract::{Extension, Multipart},
    Json,
};
use daylily_inference::AudioFormat;
use serde::Serialize;
use std::sync::Arc;

/// Multipart field names accepted for the audio upload.
const AUDIO_FIELDS: &[&str] = &["file", "audio"];

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    pub latency: f64,
    pub session_id: String,
}

/// Handler for `POST /transcribe`.
///
/// Accepts a multipart upload with the recording in a `file` (or `audio`)
/// field. WAV, MP3 and WebM are accepted; anything else is rejected before
/// the engine runs.
pub async fn transcribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(SessionContext(session_id)): Extension<SessionContext>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if !field.name().is_some_and(|name| AUDIO_FIELDS.contains(&name)) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        upload.ok_or_else(|| ApiError::BadRequest("no audio file provided".to_string()))?;
    let format = AudioFormat::from_content_type(&content_type)?;

    tracing::info!(
        session_id = %session_id,
        content_type = %content_type,
        bytes = data.len(),
        "transcription requested"
    );

    let result = state.stt_service.transcribe(&data, format).await?;

    Ok(Json(TranscribeResponse {
        transcript: result.transcript,
        latency: result.latency,
        session_id,
    }))
}
