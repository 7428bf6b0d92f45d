//! Progress tracking for downloads
//!
//! Every download gets its own [`ProgressTracker`]. The [`ProgressRegistry`]
//! keys trackers by download id and remembers the most recent one, which is
//! what a poll without an id reports.

use crate::extractor::ProgressEvent;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Finished trackers beyond this count are forgotten, oldest first
const REGISTRY_CAPACITY: usize = 64;

/// Snapshot served by the progress endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percentage: f64,
    pub status: DownloadStatus,
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            status: DownloadStatus::Idle,
        }
    }
}

/// Download status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    #[default]
    Idle,
    Downloading,
    Processing,
    Completed,
    Error,
}

impl DownloadStatus {
    /// True while yt-dlp or the file placement step is still running
    pub fn is_active(&self) -> bool {
        matches!(self, DownloadStatus::Downloading | DownloadStatus::Processing)
    }

    /// Completed or failed; nothing will update it again
    pub fn is_finished(&self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Error)
    }
}

/// Percentage for `downloaded` out of the exact total, else the estimate,
/// else 0; rounded to one decimal and clamped to 0..=100.
pub fn compute_percentage(
    downloaded_bytes: u64,
    total_bytes: Option<u64>,
    total_bytes_estimate: Option<u64>,
) -> f64 {
    let total = match total_bytes
        .filter(|t| *t > 0)
        .or(total_bytes_estimate.filter(|t| *t > 0))
    {
        Some(total) => total,
        None => return 0.0,
    };
    let pct = downloaded_bytes as f64 / total as f64 * 100.0;
    ((pct * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Progress handle for a single download
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<DownloadProgress>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DownloadProgress> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state of the download
    pub fn snapshot(&self) -> DownloadProgress {
        self.lock().clone()
    }

    /// Apply an event from the extractor.
    ///
    /// Percentage never goes backwards while downloading; late byte events
    /// after the raw download finished are ignored.
    pub fn update(&self, event: &ProgressEvent) {
        let mut progress = self.lock();
        match event {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                total_bytes_estimate,
            } => {
                if !matches!(
                    progress.status,
                    DownloadStatus::Idle | DownloadStatus::Downloading
                ) {
                    return;
                }
                let pct = compute_percentage(*downloaded_bytes, *total_bytes, *total_bytes_estimate);
                progress.percentage = progress.percentage.max(pct);
                progress.status = DownloadStatus::Downloading;
            }
            ProgressEvent::Finished => {
                if progress.status.is_active() || progress.status == DownloadStatus::Idle {
                    progress.percentage = 100.0;
                    progress.status = DownloadStatus::Processing;
                }
            }
        }
    }

    pub fn set_status(&self, status: DownloadStatus) {
        self.lock().status = status;
    }

    /// Mark as completed
    pub fn complete(&self) {
        let mut progress = self.lock();
        progress.percentage = 100.0;
        progress.status = DownloadStatus::Completed;
    }

    /// Mark as failed, keeping the last percentage
    pub fn fail(&self) {
        self.lock().status = DownloadStatus::Error;
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    trackers: HashMap<Uuid, ProgressTracker>,
    order: VecDeque<Uuid>,
    latest: Option<Uuid>,
}

/// All trackers known to the server
#[derive(Debug, Clone, Default)]
pub struct ProgressRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a fresh idle tracker for `id`, replacing any previous one,
    /// and make it the latest download.
    pub fn begin(&self, id: Uuid) -> ProgressTracker {
        let tracker = ProgressTracker::new();
        let mut inner = self.lock();

        inner.order.retain(|existing| *existing != id);
        inner.order.push_back(id);
        inner.trackers.insert(id, tracker.clone());
        inner.latest = Some(id);

        if inner.trackers.len() > REGISTRY_CAPACITY {
            prune(&mut inner);
        }

        tracker
    }

    pub fn get(&self, id: &Uuid) -> Option<ProgressTracker> {
        self.lock().trackers.get(id).cloned()
    }

    /// Snapshot for `id`, or idle when unknown
    pub fn snapshot(&self, id: &Uuid) -> DownloadProgress {
        self.get(id).map(|t| t.snapshot()).unwrap_or_default()
    }

    /// Snapshot of the most recent download, or idle when there is none
    pub fn latest(&self) -> DownloadProgress {
        let tracker = {
            let inner = self.lock();
            inner.latest.and_then(|id| inner.trackers.get(&id).cloned())
        };
        tracker.map(|t| t.snapshot()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the oldest finished trackers, never the latest one.
/// Idle trackers belong to requests that have not started yet.
fn prune(inner: &mut RegistryInner) {
    let mut index = 0;
    while inner.trackers.len() > REGISTRY_CAPACITY && index < inner.order.len() {
        let id = inner.order[index];
        let removable = Some(id) != inner.latest
            && inner
                .trackers
                .get(&id)
                .map(|t| t.snapshot().status.is_finished())
                .unwrap_or(true);
        if removable {
            inner.order.remove(index);
            inner.trackers.remove(&id);
        } else {
            index += 1;
        }
    }
}
