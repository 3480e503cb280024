//! URL reachability and kind classification

use crate::config::NetworkConfig;
use crate::error::PlatformError;
use crate::platform::{Listing, VideoPlatform};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// The URL could not be requested
    Invalid,
    SingleVideo,
    Playlist,
    Channel,
}

impl std::fmt::Display for UrlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlKind::Invalid => write!(f, "invalid"),
            UrlKind::SingleVideo => write!(f, "video"),
            UrlKind::Playlist => write!(f, "playlist"),
            UrlKind::Channel => write!(f, "channel"),
        }
    }
}

#[async_trait]
pub trait UrlProbe: Send + Sync {
    /// True only when the URL answers with HTTP 200.
    async fn check_reachable(&self, url: &str) -> bool;
}

/// Reachability over HTTP GET, following redirects.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(network: &NetworkConfig, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(network.user_agent.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn check_reachable(&self, url: &str) -> bool {
        info!("Checking URL: {}", url);

        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Malformed URL {}: {}", url, e);
                return false;
            }
        };

        match self.client.get(parsed).send().await {
            Ok(response) => {
                debug!("{} answered {}", url, response.status());
                response.status() == StatusCode::OK
            }
            Err(e) => {
                debug!("Request to {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Decides what a URL points at.
pub struct Classifier<'a> {
    probe: &'a dyn UrlProbe,
    platform: &'a dyn VideoPlatform,
}

impl<'a> Classifier<'a> {
    pub fn new(probe: &'a dyn UrlProbe, platform: &'a dyn VideoPlatform) -> Self {
        Self { probe, platform }
    }

    /// Listing for `url`, or `None` when the platform says it has nothing of that shape.
    async fn listing(&self, url: &str) -> Result<Option<Listing>, PlatformError> {
        match self.platform.fetch_listing(url).await {
            Ok(listing) => Ok(Some(listing)),
            Err(e) if e.is_negative() => {
                debug!("No listing for {}: {}", url, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn is_playlist(&self, url: &str) -> Result<bool, PlatformError> {
        let answer = self.listing(url).await?.is_some_and(|l| l.is_playlist(url));
        debug!("URL {} is {}a playlist", url, if answer { "" } else { "NOT " });
        Ok(answer)
    }

    pub async fn is_channel(&self, url: &str) -> Result<bool, PlatformError> {
        let answer = self.listing(url).await?.is_some_and(|l| l.is_channel(url));
        debug!("URL {} is {}a channel", url, if answer { "" } else { "NOT " });
        Ok(answer)
    }

    /// Probe, then decide with one ordered check: channel, playlist, single video.
    pub async fn classify(&self, url: &str) -> Result<UrlKind, PlatformError> {
        if !self.probe.check_reachable(url).await {
            return Ok(UrlKind::Invalid);
        }

        let kind = match self.listing(url).await? {
            Some(listing) if listing.is_channel(url) => UrlKind::Channel,
            Some(listing) if listing.is_playlist(url) => UrlKind::Playlist,
            _ => UrlKind::SingleVideo,
        };

        info!("URL {} classified as {}", url, kind);
        Ok(kind)
    }
}
