//! Stream selection policy

use crate::error::VideoError;
use crate::platform::RawFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Webm,
}

impl Container {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp4" => Some(Container::Mp4),
            "webm" => Some(Container::Webm),
            _ => None,
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Mp4 => write!(f, "MP4"),
            Container::Webm => write!(f, "WEBM"),
        }
    }
}

/// An encoded stream offered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub format_id: String,
    pub container: Container,
    /// Height in pixels, 0 when unknown
    pub resolution: u32,
    pub is_progressive: bool,
}

impl StreamDescriptor {
    /// `None` for containers the selector never considers.
    pub fn from_format(format: &RawFormat) -> Option<Self> {
        Some(Self {
            format_id: format.format_id.clone(),
            container: Container::from_extension(&format.ext)?,
            resolution: format.height.unwrap_or(0),
            is_progressive: format.is_progressive(),
        })
    }
}

impl std::fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "format {} ({} {}p, {})",
            self.format_id,
            self.container,
            self.resolution,
            if self.is_progressive { "progressive" } else { "adaptive" }
        )
    }
}

fn progressive(streams: &[StreamDescriptor], container: Container) -> impl Iterator<Item = &StreamDescriptor> {
    streams
        .iter()
        .filter(move |s| s.is_progressive && s.container == container)
}

/// Pick the highest resolution progressive MP4, falling back to progressive WEBM.
///
/// Ties keep the stream listed first. `url` only labels the error.
pub fn select_stream(url: &str, streams: &[StreamDescriptor]) -> Result<StreamDescriptor, VideoError> {
    let preferred = if progressive(streams, Container::Mp4).next().is_some() {
        Container::Mp4
    } else {
        Container::Webm
    };

    progressive(streams, preferred)
        .fold(None::<&StreamDescriptor>, |best, s| match best {
            Some(b) if b.resolution >= s.resolution => Some(b),
            _ => Some(s),
        })
        .cloned()
        .ok_or_else(|| VideoError::NoStreamAvailable(url.to_string()))
}
