mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, multipart_request, png_bytes, send, unconfigured_state, wav_bytes,
    write_script, MockEngines, Part,
};
use daylily_inference::{AvatarService, Transcoder};
use std::sync::Arc;

#[tokio::test]
async fn placeholder_video_is_streamed() {
    let engines = MockEngines::new();
    let audio = wav_bytes(200);
    let image = png_bytes();

    let response = send(
        engines.state(),
        multipart_request(
            "/generate-avatar",
            &[
                Part {
                    name: "audio",
                    file: Some(("test.wav", "audio/wav")),
                    data: &audio,
                },
                Part {
                    name: "image",
                    file: Some(("avatar.png", "image/png")),
                    data: &image,
                },
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "video/mp4");
    assert_eq!(response.headers()["content-length"], "16");
    assert!(response.headers().contains_key("x-latency"));
    assert_eq!(body_bytes(response).await, b"sample-mp4-bytes");
    assert!(engines.sample_video.exists());
}

#[tokio::test]
async fn rendered_video_is_streamed() {
    let engines = MockEngines::new();
    let sadtalker = write_script(
        engines.dir.path(),
        "sadtalker.sh",
        r#"printf 'rendered-mp4' > "$6""#,
    );
    let mut state = engines.state();
    state.avatar_service = Arc::new(AvatarService::new(&sadtalker, "", Transcoder::new("ffmpeg")));

    let audio = wav_bytes(200);
    let image = png_bytes();
    let response = send(
        state,
        multipart_request(
            "/generate-avatar",
            &[
                Part {
                    name: "audio",
                    file: Some(("test.wav", "audio/wav")),
                    data: &audio,
                },
                Part {
                    name: "image",
                    file: Some(("avatar.png", "image/png")),
                    data: &image,
                },
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"rendered-mp4");
}

#[tokio::test]
async fn missing_audio_is_rejected() {
    let engines = MockEngines::new();
    let image = png_bytes();

    let response = send(
        engines.state(),
        multipart_request(
            "/generate-avatar",
            &[Part {
                name: "image",
                file: Some(("avatar.png", "image/png")),
                data: &image,
            }],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_image_is_rejected() {
    let engines = MockEngines::new();
    let audio = wav_bytes(200);

    let response = send(
        engines.state(),
        multipart_request(
            "/generate-avatar",
            &[
                Part {
                    name: "audio",
                    file: Some(("test.wav", "audio/wav")),
                    data: &audio,
                },
                Part {
                    name: "image",
                    file: Some(("avatar.gif", "image/gif")),
                    data: b"GIF89a....",
                },
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "unsupported image format");
}

#[tokio::test]
async fn unconfigured_avatar_is_unavailable() {
    let audio = wav_bytes(200);

    let response = send(
        unconfigured_state(),
        multipart_request(
            "/generate-avatar",
            &[Part {
                name: "audio",
                file: Some(("test.wav", "audio/wav")),
                data: &audio,
            }],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
