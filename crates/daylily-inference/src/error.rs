use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    EmptyInput(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    TooLarge(String),

    #[error("audio conversion failed: {0}")]
    Conversion(String),

    #[error("transcription failed: {0}")]
    Stt(String),

    #[error("TTS generation failed: {0}")]
    Tts(String),

    #[error("avatar generation failed: {0}")]
    Avatar(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
