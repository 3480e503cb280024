//! Download orchestration: validate, classify, expand, then fetch each video

use crate::classifier::{Classifier, HttpProbe, UrlKind, UrlProbe};
use crate::error::{ConfigError, GrabError, VideoError};
use crate::expander::Expander;
use crate::fetcher::VideoFetcher;
use crate::platform::VideoPlatform;
use crate::request::{DownloadResult, MediaKind, MediaRequest, OutputMode};
use crate::transcoder::AudioTranscoder;
use crate::ytdlp::YtDlp;
use crate::Config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub request: MediaRequest,
    /// Required for audio requests only
    pub ffmpeg_path: Option<PathBuf>,
    /// Parent of the per-conversion scratch directories
    pub scratch_root: PathBuf,
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Validating,
    Classifying,
    Expanding { kind: UrlKind },
    Processing { index: usize, total: usize, url: String },
    VideoDone { index: usize, total: usize, result: DownloadResult },
    VideoFailed { index: usize, total: usize, url: String, error: String },
    Done { succeeded: usize, failed: usize, duration: Duration },
    Aborted { error: String },
}

/// A video that could not be downloaded. The rest of the run carried on.
#[derive(Debug)]
pub struct VideoFailure {
    pub index: usize,
    pub url: String,
    pub error: VideoError,
}

#[derive(Debug)]
pub struct RunReport {
    pub kind: UrlKind,
    pub results: Vec<DownloadResult>,
    pub failures: Vec<VideoFailure>,
}

/// Main download pipeline
pub struct Pipeline {
    config: PipelineConfig,
    probe: Arc<dyn UrlProbe>,
    platform: Arc<dyn VideoPlatform>,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        probe: Arc<dyn UrlProbe>,
        platform: Arc<dyn VideoPlatform>,
        progress_tx: mpsc::Sender<PipelineStage>,
    ) -> Self {
        Self {
            config,
            probe,
            platform,
            progress_tx,
        }
    }

    /// Wire the production collaborators (HTTP probe, yt-dlp, ffmpeg) from `app_config`.
    pub fn from_config(
        app_config: &Config,
        request: MediaRequest,
        progress_tx: mpsc::Sender<PipelineStage>,
    ) -> Result<Self, GrabError> {
        // A bad mode is reported as such, whatever tools are installed
        let mode = request.validate()?;
        let yt_dlp_path = app_config.yt_dlp_path()?;
        let ffmpeg_path = match mode {
            OutputMode::Audio => Some(app_config.ffmpeg_path()?),
            OutputMode::Video => None,
        };

        let probe = HttpProbe::new(&app_config.network, app_config.network_timeout())
            .map_err(|e| ConfigError::InvalidValue(format!("HTTP client: {}", e)))?;

        let config = PipelineConfig {
            request,
            ffmpeg_path,
            scratch_root: app_config.temp_dir(),
        };

        Ok(Self::new(
            config,
            Arc::new(probe),
            Arc::new(YtDlp::new(yt_dlp_path)),
            progress_tx,
        ))
    }

    pub async fn run(&self) -> Result<RunReport, GrabError> {
        let result = self.execute().await;
        if let Err(ref e) = result {
            let _ = self.progress_tx.send(PipelineStage::Aborted {
                error: e.to_string(),
            }).await;
        }
        result
    }

    async fn emit(&self, stage: PipelineStage) {
        let _ = self.progress_tx.send(stage).await;
    }

    async fn execute(&self) -> Result<RunReport, GrabError> {
        let start_time = Instant::now();
        let request = &self.config.request;

        // 1. Validate: nothing touches the network before this passes
        self.emit(PipelineStage::Validating).await;
        let mode = request.validate()?;
        let transcoder = match mode {
            OutputMode::Audio => {
                let ffmpeg_path = self.config.ffmpeg_path.clone().ok_or_else(|| {
                    ConfigError::InvalidValue("ffmpeg not found in PATH".to_string())
                })?;
                Some(AudioTranscoder::new(ffmpeg_path, self.config.scratch_root.clone()))
            }
            OutputMode::Video => None,
        };

        info!("Starting {:?} download for: {}", mode, request.url);

        // 2. Classify
        self.emit(PipelineStage::Classifying).await;
        let classifier = Classifier::new(self.probe.as_ref(), self.platform.as_ref());
        let kind = classifier.classify(&request.url).await?;
        if kind == UrlKind::Invalid {
            return Err(GrabError::UnreachableUrl(request.url.clone()));
        }

        // 3. Expand
        self.emit(PipelineStage::Expanding { kind }).await;
        let urls = Expander::new(self.platform.as_ref())
            .expand(&request.url, kind)
            .await?;

        // 4. Fetch each video on its own; one failure never stops the rest
        let total = urls.len();
        let media_kind = MediaKind::from(mode);
        let fetcher = VideoFetcher::new(self.platform.as_ref());
        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, url) in urls.into_iter().enumerate() {
            self.emit(PipelineStage::Processing {
                index,
                total,
                url: url.clone(),
            }).await;

            let outcome = match &transcoder {
                Some(transcoder) => {
                    transcoder
                        .to_audio(&fetcher, &url, &request.destination_dir)
                        .await
                }
                None => fetcher.fetch_video(&url, &request.destination_dir).await,
            };

            match outcome {
                Ok(file_path) => {
                    let result = DownloadResult {
                        file_path,
                        kind: media_kind,
                    };
                    self.emit(PipelineStage::VideoDone {
                        index,
                        total,
                        result: result.clone(),
                    }).await;
                    results.push(result);
                }
                Err(error) => {
                    warn!("Failed to download {}: {}", url, error);
                    self.emit(PipelineStage::VideoFailed {
                        index,
                        total,
                        url: url.clone(),
                        error: error.to_string(),
                    }).await;
                    failures.push(VideoFailure { index, url, error });
                }
            }
        }

        // 5. Done
        let duration = start_time.elapsed();
        info!(
            "Run complete: {} succeeded, {} failed ({:.1}s)",
            results.len(),
            failures.len(),
            duration.as_secs_f32()
        );
        self.emit(PipelineStage::Done {
            succeeded: results.len(),
            failed: failures.len(),
            duration,
        }).await;

        Ok(RunReport {
            kind,
            results,
            failures,
        })
    }
}
