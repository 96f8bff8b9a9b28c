#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use daylily_inference::{AvatarService, SttService, Transcoder, TtsService};
use daylily_server::{app, AppState};
use daylily_session::SessionRegistry;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const BOUNDARY: &str = "daylily-test-boundary";

/// Writes an executable shell script standing in for an external engine.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Engines backed by mock scripts in a scratch directory.
pub struct MockEngines {
    pub dir: tempfile::TempDir,
    pub whisper: PathBuf,
    pub whisper_model: PathBuf,
    pub bark: PathBuf,
    pub sample_video: PathBuf,
}

impl MockEngines {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let whisper = write_script(dir.path(), "whisper.sh", "echo ' hello from whisper'");
        let whisper_model = dir.path().join("ggml-tiny.bin");
        std::fs::write(&whisper_model, b"weights").unwrap();
        let bark = write_script(dir.path(), "bark.sh", r#"printf 'RIFF-speech' > "$4""#);
        let sample_video = dir.path().join("sample.mp4");
        std::fs::write(&sample_video, b"sample-mp4-bytes").unwrap();

        Self {
            dir,
            whisper,
            whisper_model,
            bark,
            sample_video,
        }
    }

    pub fn state(&self) -> AppState {
        self.state_with_sessions(SessionRegistry::new())
    }

    pub fn state_with_sessions(&self, sessions: SessionRegistry) -> AppState {
        let transcoder = Transcoder::new("ffmpeg");
        AppState {
            sessions,
            stt_service: Arc::new(SttService::new(
                &self.whisper_model,
                &self.whisper,
                transcoder.clone(),
            )),
            tts_service: Arc::new(TtsService::new(&self.bark, "")),
            avatar_service: Arc::new(AvatarService::new("", &self.sample_video, transcoder)),
        }
    }
}

/// State whose engines are all missing.
pub fn unconfigured_state() -> AppState {
    let transcoder = Transcoder::new("ffmpeg");
    AppState {
        sessions: SessionRegistry::with_timeout(Duration::from_secs(1800)),
        stt_service: Arc::new(SttService::new("", "", transcoder.clone())),
        tts_service: Arc::new(TtsService::new("", "")),
        avatar_service: Arc::new(AvatarService::new("", "", transcoder)),
    }
}

/// One multipart field: name, optional (filename, content type), data.
pub struct Part<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, &'a str)>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file {
            Some((filename, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        part.name, filename, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn speak_request(text: &str, session_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/speak")
        .header("content-type", "application/json");
    if let Some(id) = session_id {
        builder = builder.header("session_id", id);
    }
    builder
        .body(Body::from(serde_json::json!({ "text": text }).to_string()))
        .unwrap()
}

pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
    app(state).oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn session_header(response: &Response<Body>) -> String {
    response
        .headers()
        .get("x-session-id")
        .expect("response should carry X-Session-Id")
        .to_str()
        .unwrap()
        .to_string()
}

/// A minimal PCM WAV file with `samples` silent 16-bit mono samples.
pub fn wav_bytes(samples: usize) -> Vec<u8> {
    let data_len = (samples * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&16_000u32.to_le_bytes());
    out.extend_from_slice(&32_000u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

pub fn png_bytes() -> Vec<u8> {
    let mut out = vec![137, 80, 78, 71, 13, 10, 26, 10];
    out.resize(64, 0);
    out
}
