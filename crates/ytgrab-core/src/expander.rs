//! Expansion of playlist and channel URLs into video URLs

use crate::classifier::UrlKind;
use crate::error::PlatformError;
use crate::platform::{ListingEntry, VideoPlatform};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

/// Channel pages nest their uploads one level down, in tabs.
const MAX_DEPTH: usize = 2;

pub struct Expander<'a> {
    platform: &'a dyn VideoPlatform,
}

impl<'a> Expander<'a> {
    pub fn new(platform: &'a dyn VideoPlatform) -> Self {
        Self { platform }
    }

    /// Ordered video URLs behind `url`. A single video expands to itself.
    pub async fn expand(&self, url: &str, kind: UrlKind) -> Result<Vec<String>, PlatformError> {
        let urls = match kind {
            UrlKind::SingleVideo => vec![url.to_string()],
            UrlKind::Channel | UrlKind::Playlist => {
                let mut urls = Vec::new();
                self.collect(url.to_string(), 0, &mut urls).await?;
                urls
            }
            UrlKind::Invalid => Vec::new(),
        };

        info!("Expanded {} {} into {} video(s)", kind, url, urls.len());
        debug!("List of URLs: {}", urls.join(", "));
        Ok(urls)
    }

    fn collect<'s>(
        &'s self,
        url: String,
        depth: usize,
        out: &'s mut Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PlatformError>> + Send + 's>> {
        Box::pin(async move {
            let listing = self.platform.fetch_listing(&url).await?;
            for entry in listing.entries {
                self.visit(entry, depth, out).await?;
            }
            Ok(())
        })
    }

    async fn visit(
        &self,
        entry: ListingEntry,
        depth: usize,
        out: &mut Vec<String>,
    ) -> Result<(), PlatformError> {
        if entry.is_collection() {
            match entry.url.clone() {
                Some(nested) if depth + 1 < MAX_DEPTH => self.collect(nested, depth + 1, out).await?,
                _ => debug!("Skipping nested listing {:?}", entry.url),
            }
            return Ok(());
        }

        match entry.video_url() {
            Some(video) => out.push(video),
            None => debug!("Skipping entry without id or URL: {:?}", entry.title),
        }
        Ok(())
    }
}
