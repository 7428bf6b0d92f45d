//! Normalization of yt-dlp format lists into the quality choices shown in the UI

use crate::extractor::models::{Format, VideoInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MAX_VIDEO_FORMATS: usize = 8;
pub const MAX_AUDIO_FORMATS: usize = 5;
pub const MIN_VIDEO_HEIGHT: u32 = 144;
pub const MAX_AUDIO_BITRATE: u32 = 320;

const DEFAULT_TITLE: &str = "Sin título";
const DEFAULT_AUTHOR: &str = "Desconocido";

/// A combined audio+video stream, one per height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub format_id: String,
    pub quality: String,
    pub height: u32,
    pub ext: String,
    pub filesize: u64,
    pub fps: f64,
    pub resolution: String,
}

/// An audio-only stream, one per bitrate; always delivered as mp3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub format_id: String,
    pub quality: String,
    pub bitrate: u32,
    pub ext: String,
    pub filesize: u64,
}

/// What the info endpoint returns for a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub title: String,
    pub thumbnail: String,
    pub duration: u64,
    pub author: String,
    pub views: u64,
    pub video_formats: Vec<VideoFormat>,
    pub audio_formats: Vec<AudioFormat>,
}

/// Build the summary for `info`, filling defaults for missing metadata.
pub fn summarize(info: &VideoInfo) -> MediaSummary {
    let (video_formats, audio_formats) = classify_formats(&info.formats);

    MediaSummary {
        title: info
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        thumbnail: info.thumbnail.clone().unwrap_or_default(),
        duration: info
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0),
        author: info
            .uploader
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        views: info.view_count.unwrap_or(0),
        video_formats,
        audio_formats,
    }
}

/// Split formats into deduplicated video and audio choices.
///
/// Video: first entry per height wins, heights below 144 dropped, sorted
/// descending, at most 8. Audio: one entry per integer bitrate in (0, 320],
/// sorted descending, at most 5. Everything else is ignored.
pub fn classify_formats(formats: &[Format]) -> (Vec<VideoFormat>, Vec<AudioFormat>) {
    let mut video = Vec::new();
    let mut audio = Vec::new();
    let mut seen_heights = HashSet::new();

    for f in formats {
        match f.height.filter(|h| *h > 0) {
            Some(height) if f.has_video() && f.has_audio() => {
                if height >= MIN_VIDEO_HEIGHT && seen_heights.insert(height) {
                    video.push(VideoFormat {
                        format_id: f.format_id.clone(),
                        quality: format!("{}p", height),
                        height,
                        ext: f.ext.clone().unwrap_or_else(|| "mp4".to_string()),
                        filesize: f.size_bytes(),
                        fps: f.fps.unwrap_or(30.0),
                        resolution: format!("{}x{}", f.width.unwrap_or(0), height),
                    });
                }
            }
            _ if f.has_audio() && !f.has_video() => {
                let bitrate = match f.abr {
                    Some(abr) if abr.is_finite() && abr > 0.0 => abr as u32,
                    _ => continue,
                };
                if bitrate > 0 && bitrate <= MAX_AUDIO_BITRATE {
                    audio.push(AudioFormat {
                        format_id: f.format_id.clone(),
                        quality: format!("{}kbps", bitrate),
                        bitrate,
                        ext: "mp3".to_string(),
                        filesize: f.size_bytes(),
                    });
                }
            }
            _ => {}
        }
    }

    // Stable sorts keep the first-seen entry ahead of later duplicates
    video.sort_by(|a, b| b.height.cmp(&a.height));
    video.truncate(MAX_VIDEO_FORMATS);

    audio.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));
    let mut seen_bitrates = HashSet::new();
    audio.retain(|a| seen_bitrates.insert(a.bitrate));
    audio.truncate(MAX_AUDIO_FORMATS);

    (video, audio)
}
