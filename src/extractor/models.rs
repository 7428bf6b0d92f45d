//! Data structures for yt-dlp output

use serde::{Deserialize, Serialize};

/// Video information as reported by `yt-dlp --dump-json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub formats: Vec<Format>,
    #[serde(default)]
    pub extractor: Option<String>,
}

/// One stream variant offered by the source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Format {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub abr: Option<f64>, // Audio bitrate
}

impl Format {
    /// yt-dlp reports a missing stream as the literal codec "none";
    /// an absent codec field is not the same thing.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    /// Exact size when known, otherwise yt-dlp's estimate, otherwise 0
    pub fn size_bytes(&self) -> u64 {
        self.filesize
            .filter(|s| *s > 0.0)
            .or(self.filesize_approx)
            .map(|s| s.max(0.0) as u64)
            .unwrap_or(0)
    }
}

/// Byte-level progress reported while yt-dlp downloads
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading {
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
        total_bytes_estimate: Option<u64>,
    },
    /// Raw download finished; post-processing may follow
    Finished,
}
