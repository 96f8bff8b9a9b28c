//! Upload formats accepted by the engines and their validation rules.

use crate::error::InferenceError;

/// Uploads below this size are assumed to be truncated or corrupt.
pub const MIN_AUDIO_BYTES: usize = 100;

/// Maximum audio upload size (10 MiB).
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Maximum image upload size (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Audio container formats accepted for transcription and avatar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Webm,
}

impl AudioFormat {
    /// Maps an upload content type to a format.
    ///
    /// Parameters are compared with whitespace removed, so
    /// `audio/webm; codecs=opus` and `audio/webm;codecs=opus` are equivalent.
    pub fn from_content_type(content_type: &str) -> Result<Self, InferenceError> {
        let normalized: String = content_type
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => Ok(Self::Wav),
            "audio/mp3" | "audio/mpeg" => Ok(Self::Mp3),
            "audio/webm" | "audio/webm;codecs=opus" => Ok(Self::Webm),
            _ => Err(InferenceError::UnsupportedFormat(content_type.to_string())),
        }
    }

    /// File extension used for temporary copies of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Webm => "webm",
        }
    }
}

/// Rejects audio uploads that are empty, suspiciously small, or oversized.
pub fn validate_audio(data: &[u8]) -> Result<(), InferenceError> {
    if data.is_empty() {
        return Err(InferenceError::EmptyInput("audio file is empty".to_string()));
    }
    if data.len() < MIN_AUDIO_BYTES {
        return Err(InferenceError::InvalidInput(
            "audio file is too small or corrupted".to_string(),
        ));
    }
    if data.len() > MAX_AUDIO_BYTES {
        return Err(InferenceError::TooLarge(format!(
            "audio file too large: {} bytes (max {})",
            data.len(),
            MAX_AUDIO_BYTES
        )));
    }
    Ok(())
}

/// Still-image formats accepted as the avatar source face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Detects the format from the leading magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF] {
            Some(Self::Jpeg)
        } else if data.len() >= 8 && data[..8] == [137, 80, 78, 71, 13, 10, 26, 10] {
            Some(Self::Png)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Checks an image upload and returns its detected format.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, InferenceError> {
    if data.is_empty() {
        return Err(InferenceError::EmptyInput("image file is empty".to_string()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(InferenceError::TooLarge(format!(
            "image file too large: {} bytes (max {})",
            data.len(),
            MAX_IMAGE_BYTES
        )));
    }
    ImageFormat::detect(data)
        .ok_or_else(|| InferenceError::InvalidInput("unsupported image format".to_string()))
}
