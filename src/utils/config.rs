//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Loopback address the server binds to; the UI is single-user and local.
pub const BIND_ADDRESS: &str = "127.0.0.1";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// HTTP port on the loopback interface
    pub port: u16,

    /// Explicit yt-dlp binary; searched for when unset
    pub ytdlp_path: Option<PathBuf>,

    /// Directory or binary passed to yt-dlp as `--ffmpeg-location`
    pub ffmpeg_location: Option<PathBuf>,

    /// Root for per-download scratch directories (system temp when unset)
    pub temp_root: Option<PathBuf>,

    /// MP3 bitrate for audio downloads
    pub audio_quality_kbps: u32,

    /// Retry attempts for extractor operations
    pub extractor_retries: u32,

    /// Retry attempts per fragment
    pub fragment_retries: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            port: 5000,
            ytdlp_path: None,
            ffmpeg_location: None,
            temp_root: None,
            audio_quality_kbps: 192,
            extractor_retries: 3,
            fragment_retries: 10,
        }
    }
}

impl AppSettings {
    /// Load settings from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `RUSTLOADER_PORT` (e.g. "5000")
    /// - `RUSTLOADER_YTDLP` (path to the yt-dlp binary)
    /// - `RUSTLOADER_FFMPEG` (path to ffmpeg or its directory)
    pub fn from_env_or_default() -> Self {
        let mut settings = Self::default();

        if let Some(port) = std::env::var("RUSTLOADER_PORT")
            .ok()
            .and_then(|p| p.trim().parse::<u16>().ok())
        {
            settings.port = port;
        }

        if let Some(path) = non_empty_env("RUSTLOADER_YTDLP") {
            settings.ytdlp_path = Some(PathBuf::from(path));
        }

        if let Some(path) = non_empty_env("RUSTLOADER_FFMPEG") {
            settings.ffmpeg_location = Some(PathBuf::from(path));
        }

        settings
    }

    /// Socket address string the server listens on
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", BIND_ADDRESS, self.port)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
