//! ytgrab-core: resolve YouTube URLs into downloaded MP4 videos or MP3 audio

pub mod classifier;
pub mod config;
pub mod error;
pub mod expander;
pub mod fetcher;
pub mod pipeline;
pub mod platform;
pub mod request;
pub mod selector;
pub mod title;
pub mod transcoder;
pub mod ytdlp;

pub use config::Config;
pub use error::{GrabError, Result};
