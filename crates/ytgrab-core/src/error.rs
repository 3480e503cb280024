//! Error types for ytgrab-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrabError>;

/// Errors that abort a whole run (validation, classification, expansion).
#[derive(Error, Debug)]
pub enum GrabError {
    #[error("You have to set exactly one of -a (audio) or -v (video)")]
    InvalidRequestShape,

    #[error("Invalid URL: {0}")]
    UnreachableUrl(String),

    #[error("Platform query failed: {0}")]
    ExternalService(#[from] PlatformError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors scoped to a single video. The orchestrator records these and moves on.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("No progressive MP4 or WEBM stream available for {0}")]
    NoStreamAvailable(String),

    #[error("ffmpeg failed with exit code {status:?}: {stderr}")]
    TranscodeFailed { status: Option<i32>, stderr: String },

    #[error("Expected output file was not written: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    ToolNotFound,

    #[error("Unsupported URL: {0}")]
    Unsupported(String),

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("yt-dlp failed with exit code {status:?}: {stderr}")]
    CommandFailed { status: Option<i32>, stderr: String },

    #[error("Failed to parse yt-dlp output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlatformError {
    /// The platform answered, but the URL is not a resource of the queried kind.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            PlatformError::Unsupported(_)
                | PlatformError::VideoUnavailable(_)
                | PlatformError::CommandFailed { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
