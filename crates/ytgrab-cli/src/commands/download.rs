use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::mpsc;

use ytgrab_core::{
    config::Config,
    pipeline::{Pipeline, PipelineStage, RunReport},
    request::MediaRequest,
};

pub struct DownloadOptions {
    pub url: String,
    pub audio: bool,
    pub video: bool,
    pub dir: Option<PathBuf>,
}

pub async fn run(options: DownloadOptions, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    let destination_dir = options
        .dir
        .unwrap_or_else(|| config.output.default_directory.clone());

    let request = MediaRequest {
        url: options.url,
        want_audio: options.audio,
        want_video: options.video,
        destination_dir,
    };

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{prefix}[{bar:60.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>."),
    );
    pb.set_prefix("Download: ");

    // Spawn progress handler
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Validating => {}
                PipelineStage::Classifying => pb.set_message("Checking URL..."),
                PipelineStage::Expanding { kind } => {
                    pb.set_message(format!("Listing {}...", kind));
                }
                PipelineStage::Processing { total, url, .. } => {
                    pb.set_length(total as u64);
                    pb.set_message(truncate(&url, 50));
                }
                PipelineStage::VideoDone { result, .. } => {
                    pb.inc(1);
                    pb.println(format!("Saved {}", result.file_path.display()));
                }
                PipelineStage::VideoFailed { url, error, .. } => {
                    pb.inc(1);
                    pb.println(format!("Failed {}: {}", url, error));
                }
                PipelineStage::Done { duration, .. } => {
                    pb.finish_with_message(format!("done ({:.1}s)", duration.as_secs_f32()));
                }
                PipelineStage::Aborted { .. } => pb.finish_and_clear(),
            }
        }
    });

    // Run pipeline
    let result = match Pipeline::from_config(&config, request, tx) {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => Err(e),
    };

    // Wait for progress handler
    progress_handle.await?;

    match result {
        Ok(report) => Ok(summarize(&report)),
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn summarize(report: &RunReport) -> ExitCode {
    if report.results.is_empty() && report.failures.is_empty() {
        println!("Nothing to download: the {} is empty", report.kind);
        return ExitCode::SUCCESS;
    }

    println!("\n=== Download Complete ===");
    println!("Succeeded: {}", report.results.len());
    println!("Failed: {}", report.failures.len());

    if !report.failures.is_empty() {
        println!("\nFailed URLs:");
        for failure in &report.failures {
            println!("  {} - {}", failure.url, failure.error);
        }
    }

    if report.results.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
