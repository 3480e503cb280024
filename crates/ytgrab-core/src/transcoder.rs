//! MP4 to MP3 conversion with FFmpeg

use crate::error::VideoError;
use crate::fetcher::VideoFetcher;
use crate::request::MediaKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct AudioTranscoder {
    ffmpeg_path: PathBuf,
    scratch_root: PathBuf,
}

impl AudioTranscoder {
    pub fn new(ffmpeg_path: PathBuf, scratch_root: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            scratch_root,
        }
    }

    /// Fetch `url` into a scratch directory, convert it into `final_directory`,
    /// and delete the scratch video.
    pub async fn to_audio(
        &self,
        fetcher: &VideoFetcher<'_>,
        url: &str,
        final_directory: &Path,
    ) -> Result<PathBuf, VideoError> {
        info!("Downloading audio from {} into {}", url, final_directory.display());

        tokio::fs::create_dir_all(&self.scratch_root).await?;
        // Removed with everything in it when dropped, whichever way we leave.
        let scratch = tempfile::Builder::new()
            .prefix("ytgrab-")
            .tempdir_in(&self.scratch_root)?;
        debug!("Scratch directory: {}", scratch.path().display());

        let video_path = fetcher.fetch_video(url, scratch.path()).await?;
        let audio_path = audio_path_for(&video_path, final_directory)?;

        tokio::fs::create_dir_all(final_directory).await?;
        self.convert(&video_path, &audio_path).await?;

        debug!("Deleting scratch video: {}", video_path.display());
        // The audio is already written; the scratch guard retries on drop
        if let Err(e) = tokio::fs::remove_file(&video_path).await {
            warn!("Failed to delete scratch video {}: {}", video_path.display(), e);
        }
        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch directory: {}", e);
        }

        info!("Audio saved: {}", audio_path.display());
        Ok(audio_path)
    }

    /// Run `ffmpeg -y -i <video> <audio> -hide_banner -loglevel error`.
    pub async fn convert(&self, video: &Path, audio: &Path) -> Result<(), VideoError> {
        info!("Converting {} to {}", video.display(), audio.display());

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-y").arg("-i").arg(video).arg(audio);
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        debug!("Command to run: {:?}", cmd);

        let output = cmd.output().await?;

        if !output.status.success() {
            return Err(VideoError::TranscodeFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // A zero exit status alone does not prove ffmpeg wrote anything.
        if !tokio::fs::try_exists(audio).await? {
            return Err(VideoError::TranscodeFailed {
                status: output.status.code(),
                stderr: format!("no output written to {}", audio.display()),
            });
        }

        debug!("Encoded to: {}", audio.display());
        Ok(())
    }
}

/// `{final_directory}/{video stem}.mp3`
fn audio_path_for(video: &Path, final_directory: &Path) -> Result<PathBuf, VideoError> {
    let stem = video
        .file_stem()
        .ok_or_else(|| VideoError::MissingOutput(video.to_path_buf()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(MediaKind::Audio.extension());
    Ok(final_directory.join(name))
}
