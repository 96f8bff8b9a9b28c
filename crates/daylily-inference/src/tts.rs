use crate::error::InferenceError;
use crate::process::{self, binary_available, latency_since, temp_path};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// Timeout for TTS process execution. Bark on CPU is slow.
const TTS_TIMEOUT: Duration = Duration::from_secs(180);

/// Speech synthesis backends, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsEngine {
    Bark,
    Coqui,
}

impl fmt::Display for TtsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bark => f.write_str("bark"),
            Self::Coqui => f.write_str("coqui"),
        }
    }
}

/// Synthesised audio.
#[derive(Debug, Clone)]
pub struct Speech {
    /// Complete WAV file contents.
    pub wav: Vec<u8>,
    pub latency: f64,
    pub engine: TtsEngine,
}

/// Text-to-speech via Bark, falling back to Coqui TTS.
#[derive(Debug, Clone)]
pub struct TtsService {
    bark_binary: PathBuf,
    coqui_binary: PathBuf,
}

impl TtsService {
    /// Creates a service from the two engine paths. An empty path means the
    /// engine is not installed.
    pub fn new(bark_binary: impl AsRef<Path>, coqui_binary: impl AsRef<Path>) -> Self {
        Self {
            bark_binary: bark_binary.as_ref().to_path_buf(),
            coqui_binary: coqui_binary.as_ref().to_path_buf(),
        }
    }

    /// Picks the engine that will serve the next request.
    pub fn engine(&self) -> Result<TtsEngine, InferenceError> {
        if binary_available(&self.bark_binary) {
            Ok(TtsEngine::Bark)
        } else if binary_available(&self.coqui_binary) {
            Ok(TtsEngine::Coqui)
        } else {
            Err(InferenceError::NotConfigured(
                "text-to-speech (neither bark nor coqui is available)".to_string(),
            ))
        }
    }

    pub fn check_ready(&self) -> Result<(), InferenceError> {
        self.engine().map(|_| ())
    }

    pub async fn synthesize(&self, text: &str) -> Result<Speech, InferenceError> {
        if text.trim().is_empty() {
            return Err(InferenceError::EmptyInput("text input is empty".to_string()));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(InferenceError::TooLarge(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let start = Instant::now();
        let engine = self.engine()?;
        let wav_path = temp_path("wav")?;

        let command = match engine {
            TtsEngine::Bark => {
                let mut command = Command::new(&self.bark_binary);
                command
                    .arg("--text")
                    .arg(text)
                    .arg("--output")
                    .arg(&*wav_path);
                command
            }
            TtsEngine::Coqui => {
                let mut command = Command::new(&self.coqui_binary);
                command
                    .arg("--text")
                    .arg(text)
                    .arg("--out_path")
                    .arg(&*wav_path);
                command
            }
        };

        let name = engine.to_string();
        process::run(command, TTS_TIMEOUT, &name)
            .await
            .map_err(InferenceError::Tts)?;

        let wav = tokio::fs::read(&wav_path).await?;
        if wav.is_empty() {
            return Err(InferenceError::Tts(format!("{} produced no audio", engine)));
        }

        let latency = latency_since(start);
        tracing::info!(%engine, latency, bytes = wav.len(), "speech synthesised");

        Ok(Speech {
            wav,
            latency,
            engine,
        })
    }
}
