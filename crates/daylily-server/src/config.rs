//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session registry settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// External inference engines.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "daylily_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Session expiry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sliding expiration window in seconds.
    #[serde(default = "default_session_timeout")]
    pub timeout_seconds: u64,

    /// How often expired sessions are swept. `0` disables the sweep.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

/// Paths to the external programs that do the actual inference.
///
/// An empty string disables that engine.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,

    /// whisper.cpp compatible CLI.
    #[serde(default = "default_whisper_binary")]
    pub whisper_binary: String,

    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,

    /// Bark wrapper script (preferred TTS engine).
    #[serde(default)]
    pub bark_binary: String,

    /// Coqui `tts` CLI (fallback TTS engine).
    #[serde(default = "default_coqui_binary")]
    pub coqui_binary: String,

    /// SadTalker wrapper script. When empty, `sample_video` is served instead.
    #[serde(default)]
    pub sadtalker_binary: String,

    #[serde(default = "default_sample_video")]
    pub sample_video: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_session_timeout() -> u64 {
    1800
}

fn default_cleanup_interval() -> u64 {
    300
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_whisper_binary() -> String {
    "whisper-cli".to_string()
}

fn default_whisper_model() -> String {
    "models/ggml-tiny.bin".to_string()
}

fn default_coqui_binary() -> String {
    "tts".to_string()
}

fn default_sample_video() -> String {
    "assets/sample_avatar.mp4".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_session_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: default_ffmpeg_binary(),
            whisper_binary: default_whisper_binary(),
            whisper_model: default_whisper_model(),
            bark_binary: String::new(),
            coqui_binary: default_coqui_binary(),
            sadtalker_binary: String::new(),
            sample_video: default_sample_video(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `DAYLILY_HOST`, `DAYLILY_PORT`
/// - `DAYLILY_LOG_LEVEL`, `DAYLILY_LOG_JSON` (set to "true" to enable)
/// - `DAYLILY_SESSION_TIMEOUT_SECONDS`, `DAYLILY_SESSION_CLEANUP_INTERVAL_SECONDS`
/// - `DAYLILY_FFMPEG_BINARY`, `DAYLILY_WHISPER_BINARY`, `DAYLILY_WHISPER_MODEL`,
///   `DAYLILY_BARK_BINARY`, `DAYLILY_COQUI_BINARY`, `DAYLILY_SADTALKER_BINARY`,
///   `DAYLILY_SAMPLE_VIDEO`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => parse_config_file(p)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn parse_config_file(path: &str) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(ConfigError::FileRead(e)),
    }
}

/// Applies `DAYLILY_*` overrides read through `var`. Unparseable numeric
/// values are ignored.
pub(crate) fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(parsed) = var("DAYLILY_HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = var("DAYLILY_PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }
    if let Some(level) = var("DAYLILY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("DAYLILY_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(parsed) = var("DAYLILY_SESSION_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
        config.session.timeout_seconds = parsed;
    }
    if let Some(parsed) =
        var("DAYLILY_SESSION_CLEANUP_INTERVAL_SECONDS").and_then(|v| v.parse().ok())
    {
        config.session.cleanup_interval_seconds = parsed;
    }

    let inference = &mut config.inference;
    for (key, slot) in [
        ("DAYLILY_FFMPEG_BINARY", &mut inference.ffmpeg_binary),
        ("DAYLILY_WHISPER_BINARY", &mut inference.whisper_binary),
        ("DAYLILY_WHISPER_MODEL", &mut inference.whisper_model),
        ("DAYLILY_BARK_BINARY", &mut inference.bark_binary),
        ("DAYLILY_COQUI_BINARY", &mut inference.coqui_binary),
        ("DAYLILY_SADTALKER_BINARY", &mut inference.sadtalker_binary),
        ("DAYLILY_SAMPLE_VIDEO", &mut inference.sample_video),
    ] {
        if let Some(value) = var(key) {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.session.timeout_seconds, 1800);
        assert_eq!(config.session.cleanup_interval_seconds, 300);
        assert!(config.inference.bark_binary.is_empty());
        assert!(!config.logging.json);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9100

            [session]
            timeout_seconds = 60

            [inference]
            sadtalker_binary = "/opt/sadtalker/run.sh"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.session.timeout_seconds, 60);
        assert_eq!(config.session.cleanup_interval_seconds, 300);
        assert_eq!(config.inference.sadtalker_binary, "/opt/sadtalker/run.sh");
        assert_eq!(config.inference.ffmpeg_binary, "ffmpeg");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = parse_config_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            parse_config_file(path.to_str().unwrap()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DAYLILY_PORT", "9000"),
            ("DAYLILY_HOST", "0.0.0.0"),
            ("DAYLILY_LOG_JSON", "1"),
            ("DAYLILY_SESSION_TIMEOUT_SECONDS", "2"),
            ("DAYLILY_SESSION_CLEANUP_INTERVAL_SECONDS", "not-a-number"),
            ("DAYLILY_BARK_BINARY", "/usr/local/bin/bark"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert!(config.logging.json);
        assert_eq!(config.session.timeout_seconds, 2);
        assert_eq!(config.session.cleanup_interval_seconds, 300);
        assert_eq!(config.inference.bark_binary, "/usr/local/bin/bark");
    }
}
