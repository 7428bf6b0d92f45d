//! A single download: yt-dlp into a scratch directory, then into the
//! user's folder.

use crate::downloader::files::{find_output_file, place_file};
use crate::downloader::progress::{DownloadStatus, ProgressTracker};
use crate::extractor::options::{parse_quality, ExtractorOptions, MediaKind, ProgressHook};
use crate::extractor::{Extractor, ProgressEvent};
use crate::utils::{AppSettings, RustloaderError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Body of `POST /api/download`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub save_path: Option<String>,
    pub quality: Option<String>,
    /// Lets the client poll progress before the response arrives
    pub download_id: Option<Uuid>,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSpec {
    pub url: String,
    pub kind: MediaKind,
    pub destination: PathBuf,
    pub max_height: Option<u32>,
}

impl DownloadRequest {
    /// Check required fields before anything external runs
    pub fn validate(&self) -> Result<DownloadSpec, RustloaderError> {
        let url = non_blank(self.url.as_deref());
        let save_path = non_blank(self.save_path.as_deref());
        let (url, save_path) = match (url, save_path) {
            (Some(url), Some(save_path)) => (url, save_path),
            _ => return Err(RustloaderError::Validation("Datos incompletos".to_string())),
        };

        let kind = match non_blank(self.kind.as_deref()) {
            None => MediaKind::Video,
            Some(value) => MediaKind::parse(value).ok_or_else(|| {
                RustloaderError::Validation(format!("Tipo de descarga no válido: {}", value))
            })?,
        };

        // Audio is always best quality; the selector only limits video height
        let max_height = match kind {
            MediaKind::Video => non_blank(self.quality.as_deref()).and_then(parse_quality),
            MediaKind::Audio => None,
        };

        Ok(DownloadSpec {
            url: url.to_string(),
            kind,
            destination: PathBuf::from(save_path),
            max_height,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Result of a completed download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadOutcome {
    pub filename: String,
    pub path: String,
    pub saved_to: PathBuf,
}

/// Runs downloads against an extractor
#[derive(Clone)]
pub struct DownloadJob {
    extractor: Arc<dyn Extractor>,
    settings: Arc<AppSettings>,
}

impl DownloadJob {
    pub fn new(extractor: Arc<dyn Extractor>, settings: Arc<AppSettings>) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    /// Run one download, driving `tracker` through
    /// downloading → processing → completed, or to error on any failure.
    /// The scratch directory is removed whatever the outcome.
    pub async fn run(
        &self,
        spec: &DownloadSpec,
        tracker: &ProgressTracker,
    ) -> Result<DownloadOutcome, RustloaderError> {
        info!(
            "Starting {} download of {} into {}",
            spec.kind.as_str(),
            spec.url,
            spec.destination.display()
        );

        let scratch = match self.scratch_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracker.fail();
                return Err(RustloaderError::Filesystem(format!(
                    "could not create temporary directory: {}",
                    e
                )));
            }
        };
        debug!("Scratch directory: {}", scratch.path().display());

        let result = self.run_in(scratch.path(), spec, tracker).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!("Failed to clean up {}: {}", scratch_path.display(), e);
        }

        match &result {
            Ok(outcome) => info!("File saved to {}", outcome.saved_to.display()),
            Err(e) => {
                tracker.fail();
                error!("Download failed: {}", e);
            }
        }
        result
    }

    fn scratch_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("rustloader-");
        match &self.settings.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    async fn run_in(
        &self,
        scratch: &Path,
        spec: &DownloadSpec,
        tracker: &ProgressTracker,
    ) -> Result<DownloadOutcome, RustloaderError> {
        if !spec.destination.is_dir() {
            return Err(RustloaderError::Filesystem(format!(
                "destination folder does not exist: {}",
                spec.destination.display()
            )));
        }

        let hook_tracker = tracker.clone();
        let hook: ProgressHook = Arc::new(move |event: &ProgressEvent| hook_tracker.update(event));
        let options = ExtractorOptions::for_download(
            &self.settings,
            scratch,
            spec.kind,
            spec.max_height,
            hook,
        );

        tracker.set_status(DownloadStatus::Downloading);
        self.extractor
            .download(&spec.url, &options)
            .await
            .map_err(RustloaderError::from_download)?;

        tracker.set_status(DownloadStatus::Processing);

        let produced = find_output_file(scratch, spec.kind)
            .await?
            .ok_or_else(|| {
                RustloaderError::PostProcess("No se pudo descargar el archivo".to_string())
            })?;
        debug!("Found output file {}", produced.display());

        let saved_to = place_file(&produced, &spec.destination)
            .await
            .map_err(|e| {
                RustloaderError::Filesystem(format!(
                    "could not move file to {}: {}",
                    spec.destination.display(),
                    e
                ))
            })?;

        tracker.complete();

        let filename = saved_to
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(DownloadOutcome {
            filename,
            path: spec.destination.to_string_lossy().into_owned(),
            saved_to,
        })
    }
}
