use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use ytgrab_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    println!("ytgrab configuration\n");

    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered.trim_end());

    // Unset options are omitted from TOML, so spell out what they fall back to
    println!();
    if config.paths.yt_dlp.is_none() {
        println!("# paths.yt_dlp: auto-detect");
    }
    if config.paths.ffmpeg.is_none() {
        println!("# paths.ffmpeg: auto-detect");
    }
    if config.network.timeout_secs.is_none() {
        println!("# network.timeout_secs: no timeout");
    }
    if config.temp.directory.is_none() {
        println!("# temp.directory: system temp ({})", std::env::temp_dir().display());
    }

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(default_file) = Config::default_file() {
        println!("  2. {}", default_file.display());
    }
    println!("  3. Environment variables (YTGRAB_*, e.g. YTGRAB_PATHS__FFMPEG)");

    Ok(ExitCode::SUCCESS)
}
