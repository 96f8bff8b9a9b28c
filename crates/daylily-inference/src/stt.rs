use crate::error::InferenceError;
use crate::format::{validate_audio, AudioFormat};
use crate::process::{self, binary_available, latency_since};
use crate::transcode::Transcoder;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Timeout for STT process execution.
const STT_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of a successful transcription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub transcript: String,
    /// Wall-clock seconds spent handling the request.
    pub latency: f64,
}

/// Speech-to-text through a whisper.cpp compatible command line.
#[derive(Debug, Clone)]
pub struct SttService {
    model_path: PathBuf,
    binary_path: PathBuf,
    transcoder: Transcoder,
}

impl SttService {
    pub fn new(
        model_path: impl Into<PathBuf>,
        binary_path: impl Into<PathBuf>,
        transcoder: Transcoder,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            binary_path: binary_path.into(),
            transcoder,
        }
    }

    /// Checks that the binary and model are in place without running them.
    pub fn check_ready(&self) -> Result<(), InferenceError> {
        if !binary_available(&self.binary_path) {
            return Err(InferenceError::NotConfigured(format!(
                "speech-to-text binary {:?}",
                self.binary_path
            )));
        }
        if !self.model_path.is_file() {
            return Err(InferenceError::NotConfigured(format!(
                "speech-to-text model {:?}",
                self.model_path
            )));
        }
        Ok(())
    }

    pub async fn transcribe(
        &self,
        audio_data: &[u8],
        format: AudioFormat,
    ) -> Result<Transcription, InferenceError> {
        let start = Instant::now();
        validate_audio(audio_data)?;

        let wav_path = self.transcoder.to_wav(audio_data, format).await?;

        // whisper.cpp: -nt drops timestamps, -bs 1 keeps decoding cheap.
        let mut command = Command::new(&self.binary_path);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(&*wav_path)
            .arg("-nt")
            .arg("-bs")
            .arg("1");

        let output = process::run(command, STT_TIMEOUT, "speech-to-text")
            .await
            .map_err(InferenceError::Stt)?;

        let transcript = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let latency = latency_since(start);
        tracing::info!(latency, chars = transcript.len(), "transcription complete");

        Ok(Transcription {
            transcript,
            latency,
        })
    }
}
