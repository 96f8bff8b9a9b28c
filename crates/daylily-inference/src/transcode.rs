use crate::error::InferenceError;
use crate::format::AudioFormat;
use crate::process::{self, temp_path};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempPath;
use tokio::process::Command;

/// Timeout for a single ffmpeg conversion.
const TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60);

/// Normalises uploaded audio into a WAV file on disk.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg_binary: PathBuf,
}

impl Transcoder {
    pub fn new(ffmpeg_binary: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_binary: ffmpeg_binary.into(),
        }
    }

    /// Writes `data` to a temporary `.wav` file, converting with ffmpeg when
    /// the input is not already WAV.
    ///
    /// The returned path deletes the file when dropped.
    pub async fn to_wav(&self, data: &[u8], format: AudioFormat) -> Result<TempPath, InferenceError> {
        let wav_path = temp_path("wav")?;

        match format {
            AudioFormat::Wav => {
                tokio::fs::write(&wav_path, data).await?;
            }
            AudioFormat::Mp3 | AudioFormat::Webm => {
                let input_path = temp_path(format.extension())?;
                tokio::fs::write(&input_path, data).await?;

                let mut command = Command::new(&self.ffmpeg_binary);
                command
                    .arg("-y")
                    .arg("-loglevel")
                    .arg("error")
                    .arg("-i")
                    .arg(&*input_path)
                    .arg("-ar")
                    .arg("16000")
                    .arg("-ac")
                    .arg("1")
                    .arg(&*wav_path);

                process::run(command, TRANSCODE_TIMEOUT, "ffmpeg")
                    .await
                    .map_err(InferenceError::Conversion)?;

                tracing::debug!(from = format.extension(), "converted upload to wav");
            }
        }

        let written = tokio::fs::metadata(&wav_path)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(InferenceError::Conversion(
                "failed to save audio file".to_string(),
            ));
        }

        Ok(wav_path)
    }
}
