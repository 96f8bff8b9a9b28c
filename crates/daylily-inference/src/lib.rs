//! Inference engines behind the Daylily HTTP façade.
//!
//! Every engine here is a thin call-through to an external program: a
//! whisper.cpp compatible binary for speech-to-text, Bark or Coqui wrappers
//! for text-to-speech, a SadTalker wrapper for talking-avatar video, and
//! `ffmpeg` for normalising uploaded audio to WAV. This crate owns input
//! validation, temporary-file bookkeeping and process timeouts; the models
//! themselves live outside the repository.

pub mod avatar;
pub mod error;
pub mod format;
mod process;
pub mod stt;
pub mod transcode;
pub mod tts;

pub use avatar::{AvatarService, AvatarVideo, VideoSource};
pub use error::InferenceError;
pub use format::{AudioFormat, ImageFormat};
pub use stt::{SttService, Transcription};
pub use transcode::Transcoder;
pub use tts::{Speech, TtsEngine, TtsService};
