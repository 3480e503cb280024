//! Video platform access through yt-dlp

use crate::error::PlatformError;
use crate::platform::{Listing, VideoDetails, VideoPlatform};
use crate::selector::StreamDescriptor;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct YtDlp {
    yt_dlp_path: PathBuf,
}

impl YtDlp {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    async fn run(&self, args: &[&str], url: &str) -> Result<Vec<u8>, PlatformError> {
        debug!("yt-dlp {} {}", args.join(" "), url);

        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PlatformError::ToolNotFound,
                _ => PlatformError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(classify_failure(url, output.status.code(), &stderr));
        }

        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str], url: &str) -> Result<T, PlatformError> {
        let stdout = self.run(args, url).await?;
        serde_json::from_slice(&stdout).map_err(|e| PlatformError::Parse(e.to_string()))
    }
}

/// Map yt-dlp's stderr onto the error the caller can act on.
fn classify_failure(url: &str, status: Option<i32>, stderr: &str) -> PlatformError {
    if stderr.contains("Unsupported URL") || stderr.contains("is not a valid URL") {
        return PlatformError::Unsupported(url.to_string());
    }
    if stderr.contains("Video unavailable") || stderr.contains("Private video") {
        return PlatformError::VideoUnavailable(url.to_string());
    }
    PlatformError::CommandFailed {
        status,
        stderr: stderr.trim().to_string(),
    }
}

#[async_trait]
impl VideoPlatform for YtDlp {
    async fn fetch_listing(&self, url: &str) -> Result<Listing, PlatformError> {
        self.run_json(&["--flat-playlist", "-J"], url).await
    }

    async fn fetch_video(&self, url: &str) -> Result<VideoDetails, PlatformError> {
        self.run_json(&["-J", "--no-playlist"], url).await
    }

    async fn download_stream(
        &self,
        url: &str,
        stream: &StreamDescriptor,
        dest: &Path,
    ) -> Result<(), PlatformError> {
        // `%` would otherwise be read as an output template field
        let template = dest.to_string_lossy().replace('%', "%%");
        self.run(
            &[
                "-f", stream.format_id.as_str(),
                "-o", template.as_str(),
                "--force-overwrites",
                "--no-part",
                "--no-playlist",
                "--quiet",
            ],
            url,
        )
        .await?;
        Ok(())
    }
}
