use anyhow::Result;
use std::path::Path;
use std::process::{Command, ExitCode};
use ytgrab_core::config::Config;

/// First line of `<tool> <version_flag>`, or `None` when it cannot be run.
fn version_line(path: &Path, version_flag: &str) -> Option<String> {
    let out = Command::new(path).arg(version_flag).output().ok()?;
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
}

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = Config::load(config_path)?;

    println!("ytgrab dependency check\n");

    let mut all_ok = true;

    // Check yt-dlp
    print!("yt-dlp:  ");
    match config.yt_dlp_path() {
        Ok(path) => match version_line(&path, "--version") {
            Some(v) => println!("OK ({})", v),
            None => {
                println!("FOUND but failed to get version");
                all_ok = false;
            }
        },
        Err(_) => {
            println!("NOT FOUND");
            println!("         Install with: pip install yt-dlp");
            all_ok = false;
        }
    }

    // Check FFmpeg (needed for -a only)
    print!("ffmpeg:  ");
    match config.ffmpeg_path() {
        Ok(path) => match version_line(&path, "-version") {
            Some(first_line) => {
                // Extract just version number
                let version_part = first_line.split_whitespace().nth(2).unwrap_or("unknown");
                println!("OK ({})", version_part);
            }
            None => {
                println!("FOUND but failed to get version");
                all_ok = false;
            }
        },
        Err(_) => {
            println!("NOT FOUND (audio downloads need it)");
            println!("         Install with: apt install ffmpeg / brew install ffmpeg");
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
        Ok(ExitCode::FAILURE)
    }
}
