//! What the caller asks for and what a run hands back

use crate::error::GrabError;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub url: String,
    pub want_audio: bool,
    pub want_video: bool,
    pub destination_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// MP3 transcoded from the fetched video
    Audio,
    /// MP4 as fetched
    Video,
}

impl MediaRequest {
    /// Exactly one output mode must be requested.
    pub fn validate(&self) -> Result<OutputMode, GrabError> {
        match (self.want_audio, self.want_video) {
            (true, false) => Ok(OutputMode::Audio),
            (false, true) => Ok(OutputMode::Video),
            _ => Err(GrabError::InvalidRequestShape),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }
}

impl From<OutputMode> for MediaKind {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Audio => MediaKind::Audio,
            OutputMode::Video => MediaKind::Video,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub kind: MediaKind,
}
