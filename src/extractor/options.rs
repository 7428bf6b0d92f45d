//! yt-dlp option set shared by metadata and download calls

use crate::extractor::models::ProgressEvent;
use crate::utils::AppSettings;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Callback invoked for every progress line yt-dlp emits
pub type ProgressHook = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Browser-like headers sent with every request yt-dlp makes
pub const HTTP_HEADERS: [(&str, &str); 4] = [
    ("User-Agent", USER_AGENT),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    ("Accept-Language", "en-us,en;q=0.5"),
    ("Sec-Fetch-Mode", "navigate"),
];

/// Output file name inside the scratch directory
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Machine-readable progress line; fields yt-dlp doesn't know print as "NA"
pub const PROGRESS_PREFIX: &str = "[progress]";
const PROGRESS_TEMPLATE: &str = "download:[progress] %(progress.status)s \
%(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s";

/// Kind of media the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

/// Transformation yt-dlp applies after the download
#[derive(Debug, Clone, PartialEq)]
pub enum PostProcessor {
    /// `-x --audio-format <codec> --audio-quality <kbps>K` (runs ffmpeg)
    ExtractAudio { codec: String, quality_kbps: u32 },
}

/// Options passed to yt-dlp
#[derive(Clone)]
pub struct ExtractorOptions {
    pub quiet: bool,
    pub no_warnings: bool,
    pub no_check_certificate: bool,
    pub geo_bypass: bool,
    pub extractor_retries: u32,
    pub fragment_retries: u32,
    pub skip_unavailable_fragments: bool,
    pub http_headers: Vec<(String, String)>,
    pub output_template: Option<PathBuf>,
    pub format: Option<String>,
    pub postprocessor: Option<PostProcessor>,
    pub ffmpeg_location: Option<PathBuf>,
    pub progress_hook: Option<ProgressHook>,
}

impl fmt::Debug for ExtractorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorOptions")
            .field("quiet", &self.quiet)
            .field("format", &self.format)
            .field("output_template", &self.output_template)
            .field("postprocessor", &self.postprocessor)
            .field("progress_hook", &self.progress_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl ExtractorOptions {
    /// Base option set used by every call
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            quiet: true,
            no_warnings: true,
            no_check_certificate: true,
            geo_bypass: true,
            extractor_retries: settings.extractor_retries,
            fragment_retries: settings.fragment_retries,
            skip_unavailable_fragments: true,
            http_headers: HTTP_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            output_template: None,
            format: None,
            postprocessor: None,
            ffmpeg_location: settings.ffmpeg_location.clone(),
            progress_hook: None,
        }
    }

    /// Options for a download into `scratch_dir`.
    ///
    /// Progress lines are only printed when yt-dlp isn't quiet.
    pub fn for_download(
        settings: &AppSettings,
        scratch_dir: &Path,
        kind: MediaKind,
        max_height: Option<u32>,
        hook: ProgressHook,
    ) -> Self {
        let mut opts = Self::new(settings);
        opts.quiet = false;
        opts.output_template = Some(scratch_dir.join(OUTPUT_TEMPLATE));
        opts.format = Some(format_selector(kind, max_height));
        if kind == MediaKind::Audio {
            opts.postprocessor = Some(PostProcessor::ExtractAudio {
                codec: "mp3".to_string(),
                quality_kbps: settings.audio_quality_kbps,
            });
        }
        opts.progress_hook = Some(hook);
        opts
    }

    /// Render as yt-dlp command line arguments (URL not included)
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.quiet {
            args.push("--quiet".to_string());
        }
        if self.no_warnings {
            args.push("--no-warnings".to_string());
        }
        if self.no_check_certificate {
            args.push("--no-check-certificate".to_string());
        }
        if self.geo_bypass {
            args.push("--geo-bypass".to_string());
        }
        args.push("--extractor-retries".to_string());
        args.push(self.extractor_retries.to_string());
        args.push("--fragment-retries".to_string());
        args.push(self.fragment_retries.to_string());
        if self.skip_unavailable_fragments {
            args.push("--skip-unavailable-fragments".to_string());
        }
        for (name, value) in &self.http_headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }
        if let Some(template) = &self.output_template {
            args.push("-o".to_string());
            args.push(template.to_string_lossy().into_owned());
        }
        if let Some(format) = &self.format {
            args.push("-f".to_string());
            args.push(format.clone());
        }
        match &self.postprocessor {
            Some(PostProcessor::ExtractAudio {
                codec,
                quality_kbps,
            }) => {
                args.push("-x".to_string());
                args.push("--audio-format".to_string());
                args.push(codec.clone());
                args.push("--audio-quality".to_string());
                args.push(format!("{}K", quality_kbps));
            }
            None => {}
        }
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().into_owned());
        }
        if self.progress_hook.is_some() && !self.quiet {
            args.push("--newline".to_string());
            args.push("--progress-template".to_string());
            args.push(PROGRESS_TEMPLATE.to_string());
        }

        args
    }
}

/// yt-dlp format selector for a request.
///
/// A height limit picks the best single stream at or below it, which may be
/// lower than asked for when the exact height isn't offered.
pub fn format_selector(kind: MediaKind, max_height: Option<u32>) -> String {
    match (kind, max_height) {
        (MediaKind::Audio, _) => "bestaudio/best".to_string(),
        (MediaKind::Video, Some(height)) => format!("best[height<={}]", height),
        (MediaKind::Video, None) => "best".to_string(),
    }
}

/// Parse a quality label such as "720p" into a height
pub fn parse_quality(label: &str) -> Option<u32> {
    let trimmed = label.trim();
    let digits = trimmed
        .strip_suffix('p')
        .or_else(|| trimmed.strip_suffix('P'))
        .unwrap_or(trimmed);
    digits.parse::<u32>().ok().filter(|h| *h > 0)
}
