//! Talking-avatar video generation.
//!
//! Two modes are supported. With a SadTalker wrapper configured, the driving
//! audio and source image are rendered to a fresh 720p / 24 fps MP4. Without
//! one, a configured sample video is returned as a placeholder so clients can
//! be developed against the endpoint before a GPU host is available.

use crate::error::InferenceError;
use crate::format::{validate_audio, validate_image, AudioFormat};
use crate::process::{self, binary_available, latency_since, temp_path};
use crate::transcode::Transcoder;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tokio::process::Command;

/// Timeout for a single render.
const AVATAR_TIMEOUT: Duration = Duration::from_secs(600);

const OUTPUT_SIZE: u32 = 720;
const OUTPUT_FPS: u32 = 24;

/// Where the video bytes live.
#[derive(Debug)]
pub enum VideoSource {
    /// Freshly rendered; the file is deleted when this value is dropped.
    Generated(TempPath),
    /// The shared placeholder clip. Never deleted.
    Sample(PathBuf),
}

impl VideoSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Generated(path) => &**path,
            Self::Sample(path) => &**path,
        }
    }
}

#[derive(Debug)]
pub struct AvatarVideo {
    pub source: VideoSource,
    pub latency: f64,
}

#[derive(Debug, Clone)]
pub struct AvatarService {
    sadtalker_binary: PathBuf,
    sample_video: PathBuf,
    transcoder: Transcoder,
}

impl AvatarService {
    /// Empty paths disable the corresponding mode.
    pub fn new(
        sadtalker_binary: impl Into<PathBuf>,
        sample_video: impl Into<PathBuf>,
        transcoder: Transcoder,
    ) -> Self {
        Self {
            sadtalker_binary: sadtalker_binary.into(),
            sample_video: sample_video.into(),
            transcoder,
        }
    }

    fn renders(&self) -> bool {
        !self.sadtalker_binary.as_os_str().is_empty()
    }

    pub fn check_ready(&self) -> Result<(), InferenceError> {
        if self.renders() {
            if binary_available(&self.sadtalker_binary) {
                return Ok(());
            }
            return Err(InferenceError::NotConfigured(format!(
                "avatar renderer {:?}",
                self.sadtalker_binary
            )));
        }
        if self.sample_video.is_file() {
            return Ok(());
        }
        Err(InferenceError::NotConfigured("avatar generation".to_string()))
    }

    /// Validates the uploads and produces a video for them.
    ///
    /// The source image may be omitted only in placeholder mode.
    pub async fn generate(
        &self,
        audio: &[u8],
        audio_format: AudioFormat,
        image: Option<&[u8]>,
    ) -> Result<AvatarVideo, InferenceError> {
        let start = Instant::now();
        validate_audio(audio)?;
        let image_format = image.map(validate_image).transpose()?;

        if !self.renders() {
            if self.sample_video.as_os_str().is_empty() {
                return Err(InferenceError::NotConfigured("avatar generation".to_string()));
            }
            if !self.sample_video.is_file() {
                return Err(InferenceError::Avatar(format!(
                    "sample video not found: {:?}",
                    self.sample_video
                )));
            }
            tracing::info!(path = ?self.sample_video, "serving placeholder avatar video");
            return Ok(AvatarVideo {
                source: VideoSource::Sample(self.sample_video.clone()),
                latency: latency_since(start),
            });
        }

        if !binary_available(&self.sadtalker_binary) {
            return Err(InferenceError::NotConfigured(format!(
                "avatar renderer {:?}",
                self.sadtalker_binary
            )));
        }

        let (Some(image), Some(image_format)) = (image, image_format) else {
            return Err(InferenceError::InvalidInput(
                "a source image is required".to_string(),
            ));
        };

        let audio_path = self.transcoder.to_wav(audio, audio_format).await?;
        let image_path = temp_path(image_format.extension())?;
        tokio::fs::write(&image_path, image).await?;
        let video_path = temp_path("mp4")?;

        let mut command = Command::new(&self.sadtalker_binary);
        command
            .arg("--driven_audio")
            .arg(&*audio_path)
            .arg("--source_image")
            .arg(&*image_path)
            .arg("--output")
            .arg(&*video_path)
            .arg("--size")
            .arg(OUTPUT_SIZE.to_string())
            .arg("--fps")
            .arg(OUTPUT_FPS.to_string());

        process::run(command, AVATAR_TIMEOUT, "avatar renderer")
            .await
            .map_err(InferenceError::Avatar)?;

        let size = tokio::fs::metadata(&video_path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(InferenceError::Avatar(
                "renderer produced no video".to_string(),
            ));
        }

        let latency = latency_since(start);
        tracing::info!(latency, bytes = size, "avatar video rendered");

        Ok(AvatarVideo {
            source: VideoSource::Generated(video_path),
            latency,
        })
    }
}
