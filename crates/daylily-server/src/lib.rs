//! Daylily HTTP server library logic.
//!
//! Exposes speech-to-text, text-to-speech and talking-avatar endpoints over
//! the engines in `daylily-inference`, with every inference request bound to
//! a session from `daylily-session`.

pub mod api;
pub mod api_avatar;
pub mod api_speak;
pub mod api_transcribe;
pub mod background;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::{get, post},
    Extension, Router,
};
use config::Config;
use daylily_inference::{AvatarService, SttService, Transcoder, TtsService};
use daylily_session::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live client sessions.
    pub sessions: SessionRegistry,
    /// STT service.
    pub stt_service: Arc<SttService>,
    /// TTS service.
    pub tts_service: Arc<TtsService>,
    /// Avatar video service.
    pub avatar_service: Arc<AvatarService>,
}

impl AppState {
    /// Builds the registry and engine wrappers described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let inference = &config.inference;
        let transcoder = Transcoder::new(&inference.ffmpeg_binary);

        Self {
            sessions: SessionRegistry::with_timeout(Duration::from_secs(
                config.session.timeout_seconds,
            )),
            stt_service: Arc::new(SttService::new(
                &inference.whisper_model,
                &inference.whisper_binary,
                transcoder.clone(),
            )),
            tts_service: Arc::new(TtsService::new(
                &inference.bark_binary,
                &inference.coqui_binary,
            )),
            avatar_service: Arc::new(AvatarService::new(
                &inference.sadtalker_binary,
                &inference.sample_video,
                transcoder,
            )),
        }
    }
}

/// Maximum request body size for JSON endpoints (2 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Hard ceiling for multipart uploads; handlers enforce per-field limits.
const MAX_UPLOAD_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Response header carrying the wall-clock inference time in seconds.
pub const LATENCY_HEADER: HeaderName = HeaderName::from_static("x-latency");

/// Response header echoing the session the request was bound to.
pub const SESSION_HEADER: HeaderName = HeaderName::from_static("x-session-id");

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let speak_routes = Router::new()
        .route("/speak", post(api_speak::speak_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES));

    let upload_routes = Router::new()
        .route("/transcribe", post(api_transcribe::transcribe_handler))
        .route("/generate-avatar", post(api_avatar::generate_avatar_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES));

    let session_routes = speak_routes
        .merge(upload_routes)
        .layer(axum::middleware::from_fn(middleware::session_middleware));

    Router::new()
        .route("/status", get(api::status_handler))
        .route("/warmup", post(api::warmup_handler))
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([LATENCY_HEADER, SESSION_HEADER]),
        )
        .layer(Extension(Arc::new(state)))
}
