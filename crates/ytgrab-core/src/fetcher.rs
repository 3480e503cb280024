//! Video download to `{dir}/{sanitized title}.mp4`

use crate::error::VideoError;
use crate::platform::VideoPlatform;
use crate::request::MediaKind;
use crate::selector::select_stream;
use crate::title::VideoTarget;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct VideoFetcher<'a> {
    platform: &'a dyn VideoPlatform,
}

impl<'a> VideoFetcher<'a> {
    pub fn new(platform: &'a dyn VideoPlatform) -> Self {
        Self { platform }
    }

    /// Download the best stream of `url` into `directory`, returning the written path.
    ///
    /// An existing file with the same name is overwritten.
    pub async fn fetch_video(&self, url: &str, directory: &Path) -> Result<PathBuf, VideoError> {
        info!("Downloading video {} into {}", url, directory.display());

        let details = self.platform.fetch_video(url).await?;
        let target = VideoTarget::new(url, details.title.clone());
        debug!("title: {}", target.sanitized_title);

        let stream = select_stream(url, &details.streams())?;
        debug!("Chosen stream: {}", stream);

        tokio::fs::create_dir_all(directory).await?;
        let file_path = directory.join(target.file_name(MediaKind::Video.extension()));
        debug!("filename: {}", file_path.display());

        self.platform.download_stream(url, &stream, &file_path).await?;

        if !tokio::fs::try_exists(&file_path).await? {
            return Err(VideoError::MissingOutput(file_path));
        }

        info!("Video saved: {}", file_path.display());
        Ok(file_path)
    }
}
