//! End-to-end pipeline runs against an in-memory platform, without the network.
//!
//! Audio runs use small shell scripts standing in for ffmpeg, so they are unix-only.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

use ytgrab_core::classifier::{UrlKind, UrlProbe};
use ytgrab_core::error::{GrabError, PlatformError, VideoError};
use ytgrab_core::pipeline::{Pipeline, PipelineConfig, PipelineStage, RunReport};
use ytgrab_core::platform::{Listing, VideoDetails, VideoPlatform};
use ytgrab_core::request::{MediaKind, MediaRequest};
use ytgrab_core::selector::StreamDescriptor;

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=NTa6Xbzfq1U";
const VIDEO_TITLE: &str = "Super Mario Bros. Theme Song";
const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLmixed";
const BLOCKED_URL: &str = "https://www.youtube.com/watch?v=adaptiveOnly";

const PROGRESSIVE_FORMATS: &str = r#"[
    {"format_id": "18", "ext": "mp4", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360},
    {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none", "height": 1080}
]"#;
const ADAPTIVE_FORMATS: &str = r#"[
    {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none", "height": 1080},
    {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2"}
]"#;

struct FakeProbe {
    reachable: bool,
    calls: AtomicUsize,
}

impl FakeProbe {
    fn new(reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            reachable,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl UrlProbe for FakeProbe {
    async fn check_reachable(&self, _url: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }
}

#[derive(Default)]
struct FakePlatform {
    listings: HashMap<String, String>,
    videos: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FakePlatform {
    fn with_video(mut self, url: &str, title: &str, formats: &str) -> Self {
        let details = format!(r#"{{"id": "x", "title": "{title}", "formats": {formats}}}"#);
        self.videos.insert(url.to_string(), details);
        self
    }

    fn with_playlist(mut self, url: &str, members: &[&str]) -> Self {
        let entries: Vec<String> = members
            .iter()
            .map(|m| format!(r#"{{"_type": "url", "ie_key": "Youtube", "url": "{m}"}}"#))
            .collect();
        let listing = format!(
            r#"{{"_type": "playlist", "id": "PLmixed", "channel_id": "UCowner", "entries": [{}]}}"#,
            entries.join(",")
        );
        self.listings.insert(url.to_string(), listing);
        self
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn fetch_listing(&self, url: &str) -> Result<Listing, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.listings.get(url) {
            Some(json) => Ok(serde_json::from_str(json).unwrap()),
            // what yt-dlp reports for a plain video under --flat-playlist is irrelevant here
            None => Ok(Listing {
                result_type: Some("video".to_string()),
                ..Default::default()
            }),
        }
    }

    async fn fetch_video(&self, url: &str) -> Result<VideoDetails, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.videos
            .get(url)
            .map(|json| serde_json::from_str(json).unwrap())
            .ok_or_else(|| PlatformError::VideoUnavailable(url.to_string()))
    }

    async fn download_stream(
        &self,
        url: &str,
        stream: &StreamDescriptor,
        dest: &Path,
    ) -> Result<(), PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = format!("{url} as format {}", stream.format_id);
        tokio::fs::write(dest, body).await?;
        Ok(())
    }
}

struct Workspace {
    _root: TempDir,
    output: PathBuf,
    scratch: PathBuf,
}

fn workspace() -> Workspace {
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("out");
    let scratch = root.path().join("scratch");
    std::fs::create_dir_all(&scratch).unwrap();
    Workspace {
        output,
        scratch,
        _root: root,
    }
}

fn request(url: &str, want_audio: bool, want_video: bool, dir: &Path) -> MediaRequest {
    MediaRequest {
        url: url.to_string(),
        want_audio,
        want_video,
        destination_dir: dir.to_path_buf(),
    }
}

async fn run(
    request: MediaRequest,
    ffmpeg_path: Option<PathBuf>,
    scratch_root: &Path,
    probe: Arc<FakeProbe>,
    platform: Arc<FakePlatform>,
) -> (Result<RunReport, GrabError>, Vec<PipelineStage>) {
    let (tx, mut rx) = mpsc::channel(256);
    let config = PipelineConfig {
        request,
        ffmpeg_path,
        scratch_root: scratch_root.to_path_buf(),
    };
    let pipeline = Pipeline::new(config, probe, platform, tx);
    let result = pipeline.run().await;
    drop(pipeline);

    let mut stages = Vec::new();
    while let Some(stage) = rx.recv().await {
        stages.push(stage);
    }
    (result, stages)
}

fn scratch_is_empty(scratch: &Path) -> bool {
    std::fs::read_dir(scratch).unwrap().next().is_none()
}

#[cfg(unix)]
mod ffmpeg_stub {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use tempfile::TempDir;

    pub struct Stubs {
        _dir: TempDir,
        /// Copies the input to the output, like a (very) lossless encoder
        pub copying: PathBuf,
        /// Exits non-zero with a message on stderr
        pub failing: PathBuf,
        /// Exits zero without writing anything
        pub silent: PathBuf,
        /// Moves the input to the output, leaving no scratch video to delete
        pub moving: PathBuf,
    }

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Written once per test binary, before any test spawns them.
    pub fn stubs() -> &'static Stubs {
        static STUBS: OnceLock<Stubs> = OnceLock::new();
        STUBS.get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            // invoked as: -y -i <input> <output> -hide_banner -loglevel error
            let copying = script(
                dir.path(),
                "ffmpeg-copy",
                r#"[ "$1" = "-y" ] && [ "$2" = "-i" ] && [ "$5" = "-hide_banner" ] || exit 3
cp "$3" "$4""#,
            );
            let failing = script(dir.path(), "ffmpeg-fail", "echo 'Invalid data found when processing input' >&2\nexit 1");
            let silent = script(dir.path(), "ffmpeg-silent", "exit 0");
            let moving = script(dir.path(), "ffmpeg-move", r#"mv "$3" "$4""#);
            Stubs {
                _dir: dir,
                copying,
                failing,
                silent,
                moving,
            }
        })
    }
}

#[tokio::test]
async fn video_mode_single_video() {
    let ws = workspace();
    let probe = FakeProbe::new(true);
    let platform = Arc::new(FakePlatform::default().with_video(VIDEO_URL, VIDEO_TITLE, PROGRESSIVE_FORMATS));

    let (result, stages) = run(
        request(VIDEO_URL, false, true, &ws.output),
        None,
        &ws.scratch,
        probe,
        platform,
    )
    .await;
    let report = result.unwrap();

    assert_eq!(report.kind, UrlKind::SingleVideo);
    assert!(report.failures.is_empty());
    assert_eq!(report.results.len(), 1);

    let result = &report.results[0];
    assert_eq!(result.kind, MediaKind::Video);
    assert_eq!(result.file_path, ws.output.join("Super_Mario_Bros._Theme_Song.mp4"));
    assert!(result.file_path.exists());

    let written = std::fs::read_to_string(&result.file_path).unwrap();
    assert!(written.ends_with("as format 18"), "picked the wrong stream: {written}");

    assert!(matches!(stages.first(), Some(PipelineStage::Validating)));
    assert!(matches!(
        stages.last(),
        Some(PipelineStage::Done { succeeded: 1, failed: 0, .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn audio_mode_single_video_leaves_no_scratch() {
    let ws = workspace();
    let probe = FakeProbe::new(true);
    let platform = Arc::new(FakePlatform::default().with_video(VIDEO_URL, VIDEO_TITLE, PROGRESSIVE_FORMATS));

    let (result, _) = run(
        request(VIDEO_URL, true, false, &ws.output),
        Some(ffmpeg_stub::stubs().copying.clone()),
        &ws.scratch,
        probe,
        platform,
    )
    .await;
    let report = result.unwrap();

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.kind, MediaKind::Audio);
    assert_eq!(result.file_path, ws.output.join("Super_Mario_Bros._Theme_Song.mp3"));
    assert!(result.file_path.exists());

    assert!(scratch_is_empty(&ws.scratch), "scratch video left behind");
    assert!(!ws.output.join("Super_Mario_Bros._Theme_Song.mp4").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn audio_mode_succeeds_when_scratch_video_is_already_gone() {
    let ws = workspace();
    let probe = FakeProbe::new(true);
    let platform = Arc::new(FakePlatform::default().with_video(VIDEO_URL, VIDEO_TITLE, PROGRESSIVE_FORMATS));

    let (result, _) = run(
        request(VIDEO_URL, true, false, &ws.output),
        Some(ffmpeg_stub::stubs().moving.clone()),
        &ws.scratch,
        probe,
        platform,
    )
    .await;
    let report = result.unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].file_path.exists());
    assert!(scratch_is_empty(&ws.scratch));
}

#[tokio::test]
async fn playlist_isolates_unavailable_video() {
    let ws = workspace();
    let probe = FakeProbe::new(true);
    let platform = Arc::new(
        FakePlatform::default()
            .with_playlist(PLAYLIST_URL, &[BLOCKED_URL, VIDEO_URL])
            .with_video(BLOCKED_URL, "Adaptive only", ADAPTIVE_FORMATS)
            .with_video(VIDEO_URL, VIDEO_TITLE, PROGRESSIVE_FORMATS),
    );

    let (result, stages) = run(
        request(PLAYLIST_URL, false, true, &ws.output),
        None,
        &ws.scratch,
        probe,
        platform,
    )
    .await;
    let report = result.unwrap();

    assert_eq!(report.kind, UrlKind::Playlist);
    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].file_path.ends_with("Super_Mario_Bros._Theme_Song.mp4"));

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.index, 0);
    assert_eq!(failure.url, BLOCKED_URL);
    assert!(matches!(failure.error, VideoError::NoStreamAvailable(_)));

    let failed_events = stages
        .iter()
        .filter(|s| matches!(s, PipelineStage::VideoFailed { .. }))
        .count();
    assert_eq!(failed_events, 1);
}

#[tokio::test]
async fn conflicting_or_missing_mode_aborts_before_network() {
    for (want_audio, want_video) in [(true, true), (false, false)] {
        let ws = workspace();
        let probe = FakeProbe::new(true);
        let platform = Arc::new(FakePlatform::default());

        let (result, stages) = run(
            request(VIDEO_URL, want_audio, want_video, &ws.output),
            None,
            &ws.scratch,
            probe.clone(),
            platform.clone(),
        )
        .await;

        assert!(matches!(result, Err(GrabError::InvalidRequestShape)));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(platform.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(stages.last(), Some(PipelineStage::Aborted { .. })));
        assert!(!ws.output.exists());
    }
}

#[tokio::test]
async fn unreachable_url_aborts() {
    let ws = workspace();
    let probe = FakeProbe::new(false);
    let platform = Arc::new(FakePlatform::default());

    let (result, _) = run(
        request("test", false, true, &ws.output),
        None,
        &ws.scratch,
        probe.clone(),
        platform.clone(),
    )
    .await;

    match result {
        Err(GrabError::UnreachableUrl(url)) => assert_eq!(url, "test"),
        other => panic!("expected UnreachableUrl, got {other:?}"),
    }
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    assert_eq!(platform.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn audio_mode_without_ffmpeg_is_a_config_error() {
    let ws = workspace();
    let probe = FakeProbe::new(true);
    let platform = Arc::new(FakePlatform::default());

    let (result, _) = run(
        request(VIDEO_URL, true, false, &ws.output),
        None,
        &ws.scratch,
        probe.clone(),
        platform,
    )
    .await;

    assert!(matches!(result, Err(GrabError::Config(_))));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn transcode_failures_are_isolated_and_cleaned_up() {
    let stubs = ffmpeg_stub::stubs();

    for ffmpeg in [&stubs.failing, &stubs.silent] {
        let ws = workspace();
        let probe = FakeProbe::new(true);
        let platform = Arc::new(FakePlatform::default().with_video(VIDEO_URL, VIDEO_TITLE, PROGRESSIVE_FORMATS));

        let (result, _) = run(
            request(VIDEO_URL, true, false, &ws.output),
            Some(ffmpeg.clone()),
            &ws.scratch,
            probe,
            platform,
        )
        .await;
        let report = result.unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, VideoError::TranscodeFailed { .. }));
        assert!(scratch_is_empty(&ws.scratch), "scratch left behind by {}", ffmpeg.display());
    }
}

#[cfg(unix)]
#[tokio::test]
async fn transcode_failure_reports_stderr() {
    let ws = workspace();
    let platform = Arc::new(FakePlatform::default().with_video(VIDEO_URL, VIDEO_TITLE, PROGRESSIVE_FORMATS));

    let (result, _) = run(
        request(VIDEO_URL, true, false, &ws.output),
        Some(ffmpeg_stub::stubs().failing.clone()),
        &ws.scratch,
        FakeProbe::new(true),
        platform,
    )
    .await;

    match &result.unwrap().failures[0].error {
        VideoError::TranscodeFailed { status, stderr } => {
            assert_eq!(*status, Some(1));
            assert_eq!(stderr, "Invalid data found when processing input");
        }
        other => panic!("expected TranscodeFailed, got {other:?}"),
    }
}
