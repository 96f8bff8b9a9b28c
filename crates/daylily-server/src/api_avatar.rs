//! Talking-avatar endpoint.

use crate::{api::ApiError, middleware::SessionContext, AppState, LATENCY_HEADER};
use axum::{
    body::{Body, Bytes},
    extract::{Extension, Multipart},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use daylily_inference::AudioFormat;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// Handler for `POST /generate-avatar`.
///
/// Expects multipart fields `audio` (the driving speech) and `image` (the
/// face to animate). The resulting MP4 is streamed from disk; a freshly
/// rendered file is deleted once the stream is dropped.
pub async fn generate_avatar_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(SessionContext(session_id)): Extension<SessionContext>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut audio: Option<(String, Bytes)> = None;
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                audio = Some((content_type, field.bytes().await?));
            }
            Some("image") => {
                image = Some(field.bytes().await?);
            }
            _ => {}
        }
    }

    let (content_type, audio) =
        audio.ok_or_else(|| ApiError::BadRequest("no audio file provided".to_string()))?;
    let format = AudioFormat::from_content_type(&content_type)?;

    tracing::info!(
        session_id = %session_id,
        audio_bytes = audio.len(),
        has_image = image.is_some(),
        "avatar video requested"
    );

    let video = state
        .avatar_service
        .generate(&audio, format, image.as_deref())
        .await?;

    let file = tokio::fs::File::open(video.source.path())
        .await
        .map_err(|e| ApiError::InternalServerError(format!("failed to open video: {}", e)))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::InternalServerError(format!("failed to stat video: {}", e)))?
        .len();

    let latency = HeaderValue::from_str(&video.latency.to_string())
        .map_err(|e| ApiError::InternalServerError(format!("invalid latency header: {}", e)))?;

    // The stream owns the video source so a temporary file outlives the body.
    let source = video.source;
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep_alive = &source;
        chunk
    });

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("video/mp4")),
            (header::CONTENT_LENGTH, HeaderValue::from(length)),
            (LATENCY_HEADER, latency),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
