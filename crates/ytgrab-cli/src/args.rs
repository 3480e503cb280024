use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytgrab")]
#[command(author, version, about = "Download YouTube videos, playlists and channels as MP4 or MP3")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// URL of a YouTube video, playlist or channel
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Save as audio MP3 file
    #[arg(short = 'a', long = "audio")]
    pub audio: bool,

    /// Save as video MP4 file
    #[arg(short = 'v', long = "video")]
    pub video: bool,

    /// Directory to store downloads (defaults to the configured directory, then ".")
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Verbose output (--verbose, --verbose --verbose)
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that yt-dlp and ffmpeg are installed
    Doctor,

    /// Show configuration
    Config,
}
