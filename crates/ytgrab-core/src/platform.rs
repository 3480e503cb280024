//! Video platform query API
//!
//! [`VideoPlatform`] isolates the pipeline from the tool that talks to the
//! platform. The production implementation is [`crate::ytdlp::YtDlp`].

use crate::error::PlatformError;
use crate::selector::StreamDescriptor;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Flat description of a URL: a single video or a collection of entries.
    async fn fetch_listing(&self, url: &str) -> Result<Listing, PlatformError>;

    /// Full metadata of a single video, including its available formats.
    async fn fetch_video(&self, url: &str) -> Result<VideoDetails, PlatformError>;

    /// Write the bytes of `stream` for the video at `url` to `dest`.
    async fn download_stream(
        &self,
        url: &str,
        stream: &StreamDescriptor,
        dest: &Path,
    ) -> Result<(), PlatformError>;
}

/// Top level of `yt-dlp --flat-playlist -J`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Listing {
    #[serde(rename = "_type", default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub entries: Vec<ListingEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingEntry {
    #[serde(rename = "_type", default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub ie_key: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

fn channel_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:https?://)?(?:www\.|m\.)?youtube\.com/(?:channel/[^/?#]+|c/[^/?#]+|user/[^/?#]+|@[^/?#]+)")
            .expect("channel pattern is valid")
    })
}

/// Does the URL point at a channel page (or one of its tabs)?
pub fn is_channel_url(url: &str) -> bool {
    channel_url_pattern().is_match(url)
}

impl Listing {
    fn is_collection(&self) -> bool {
        self.result_type.as_deref() == Some("playlist")
    }

    /// A collection owned by a channel: its id is the channel id, or its URL
    /// is a channel URL. `requested_url` covers listings without `webpage_url`.
    pub fn is_channel(&self, requested_url: &str) -> bool {
        if !self.is_collection() {
            return false;
        }
        let owned_by_channel = matches!(
            (&self.id, &self.channel_id),
            (Some(id), Some(channel)) if id == channel
        );
        owned_by_channel
            || self.webpage_url.as_deref().is_some_and(is_channel_url)
            || is_channel_url(requested_url)
    }

    pub fn is_playlist(&self, requested_url: &str) -> bool {
        self.is_collection() && !self.is_channel(requested_url)
    }
}

impl ListingEntry {
    /// Nested collection, e.g. the "Videos" tab of a channel.
    pub fn is_collection(&self) -> bool {
        self.result_type.as_deref() == Some("playlist")
            || self.ie_key.as_deref() == Some("YoutubeTab")
    }

    /// Watch URL for this entry, falling back to the canonical form built from its id.
    pub fn video_url(&self) -> Option<String> {
        match (&self.url, &self.id) {
            (Some(url), _) if url.starts_with("http") => Some(url.clone()),
            (_, Some(id)) => Some(format!("https://www.youtube.com/watch?v={}", id)),
            _ => None,
        }
    }
}

/// Output of `yt-dlp -J --no-playlist`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl RawFormat {
    fn has_codec(codec: &Option<String>) -> bool {
        codec.as_deref().is_some_and(|c| !c.is_empty() && c != "none")
    }

    /// Audio and video muxed into one file.
    pub fn is_progressive(&self) -> bool {
        Self::has_codec(&self.vcodec) && Self::has_codec(&self.acodec)
    }
}

impl VideoDetails {
    /// Formats the stream selector can choose from, in platform order.
    pub fn streams(&self) -> Vec<StreamDescriptor> {
        self.formats.iter().filter_map(StreamDescriptor::from_format).collect()
    }
}
