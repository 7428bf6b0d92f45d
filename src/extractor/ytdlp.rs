//! yt-dlp wrapper for metadata extraction and downloads
//!
//! yt-dlp is driven as a child process. Metadata comes from `--dump-json`;
//! downloads print one machine-readable progress line per update which is
//! parsed and handed to the registered progress hook.

use crate::extractor::models::{ProgressEvent, VideoInfo};
use crate::extractor::options::{ExtractorOptions, PROGRESS_PREFIX};
use crate::extractor::traits::Extractor;
use crate::utils::error::RustloaderError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Number of stderr lines kept for error reporting
const STDERR_TAIL: usize = 20;

/// Extractor backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
}

impl YtDlpExtractor {
    /// Initialize extractor and verify yt-dlp availability
    ///
    /// Search order:
    /// 1. Explicit path from settings
    /// 2. Next to the current executable
    /// 3. System PATH
    /// 4. Common installation paths (Homebrew, pip --user, etc.)
    pub fn new(explicit: Option<&Path>) -> Result<Self> {
        let ytdlp_path = match find_ytdlp(explicit) {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                path
            }
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(RustloaderError::YtDlpNotFound.into());
            }
        };

        Ok(Self { ytdlp_path })
    }

    /// Use a specific binary without searching
    pub fn with_path(ytdlp_path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    /// Uses: yt-dlp --dump-json --no-download --no-playlist
    async fn extract_info(&self, url: &str, options: &ExtractorOptions) -> Result<VideoInfo> {
        debug!("Extracting video info for URL: {}", url);

        let output = AsyncCommand::new(&self.ytdlp_path)
            .args(options.to_args())
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg("--")
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.ytdlp_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp extraction failed: {}", stderr);
            let lines: Vec<String> = stderr.lines().map(str::to_string).collect();
            return Err(RustloaderError::Extraction(error_summary(&lines)).into());
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        // Only the first document matters if a playlist slipped through
        let first = json_str.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let video_info: VideoInfo = serde_json::from_str(first)
            .map_err(|e| RustloaderError::Extraction(format!("malformed yt-dlp output: {}", e)))?;

        Ok(video_info)
    }

    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<()> {
        let args = options.to_args();
        debug!("Running yt-dlp {:?} -- {}", args, url);

        let mut child = AsyncCommand::new(&self.ytdlp_path)
            .args(&args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to run {}", self.ytdlp_path.display()))?;

        let stdout = child
            .stdout
            .take()
            .context("yt-dlp stdout was not captured")?;
        let stderr = child
            .stderr
            .take()
            .context("yt-dlp stderr was not captured")?;

        // Drain stderr concurrently so a chatty child can't fill the pipe
        let stderr_task = tokio::spawn(async move {
            let mut tail = Vec::new();
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            while let Ok(Some(line)) = next_lossy_line(&mut reader, &mut buf).await {
                debug!(target: "rustloader_web::ytdlp", "{}", line);
                if tail.len() == STDERR_TAIL {
                    tail.remove(0);
                }
                tail.push(line);
            }
            tail
        });

        // Console output is in the local code page on some platforms, so
        // lines are decoded lossily rather than rejected
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = next_lossy_line(&mut reader, &mut buf).await? {
            match parse_progress_line(&line) {
                Some(event) => {
                    if let Some(hook) = &options.progress_hook {
                        hook(&event);
                    }
                }
                None => debug!(target: "rustloader_web::ytdlp", "{}", line),
            }
        }

        let status = child.wait().await?;
        let stderr_lines = match stderr_task.await {
            Ok(lines) => lines,
            Err(e) => {
                warn!("stderr reader task failed: {}", e);
                Vec::new()
            }
        };

        if !status.success() {
            let message = error_summary(&stderr_lines);
            error!("yt-dlp download failed ({}): {}", status, message);
            return Err(RustloaderError::Download(message).into());
        }

        Ok(())
    }
}

/// Read one line, replacing invalid UTF-8. `None` at end of stream.
async fn next_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(|c| c == '\n' || c == '\r').to_string()))
}

/// Parse one line printed through the progress template.
///
/// Format: `[progress] <status> <downloaded> <total> <estimate>`, where any
/// numeric field may be "NA".
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = rest.split_whitespace();
    let status = fields.next()?;

    match status {
        "downloading" => {
            let downloaded_bytes = parse_bytes(fields.next()?).unwrap_or(0);
            let total_bytes = fields.next().and_then(parse_bytes);
            let total_bytes_estimate = fields.next().and_then(parse_bytes);
            Some(ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                total_bytes_estimate,
            })
        }
        "finished" => Some(ProgressEvent::Finished),
        _ => None,
    }
}

fn parse_bytes(field: &str) -> Option<u64> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}

/// Pick the most useful message out of yt-dlp's stderr
fn error_summary(lines: &[String]) -> String {
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.iter().rev().find(|l| !l.trim().is_empty()))
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "yt-dlp exited with an error".to_string())
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Explicit path
/// 2. Next to the executable
/// 3. System PATH
/// 4. Common installation paths
pub fn find_ytdlp(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!("Configured yt-dlp path does not exist: {:?}", path);
    }

    if let Some(bundled) = find_bundled_ytdlp() {
        info!("✓ Using bundled yt-dlp: {:?}", bundled);
        return Some(bundled);
    }

    if let Some(system) = find_in_path() {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

/// yt-dlp shipped next to our own executable
fn find_bundled_ytdlp() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    let name = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };
    let candidate = exe_dir.join(name);
    if candidate.is_file() && is_executable(&candidate) {
        return Some(candidate);
    }

    None
}

fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|p| p.exists())
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        // System
        "/usr/bin/yt-dlp",
        // pip --user
        "~/.local/bin/yt-dlp",
    ];

    for path_str in common_paths {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(path_str),
        };

        if expanded.is_file() && is_executable(&expanded) {
            return Some(expanded);
        }
    }

    None
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}

// ============================================================
// Tests
// ============================================================
