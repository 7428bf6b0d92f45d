//! Download orchestration module

pub mod files;
pub mod job;
pub mod progress;

// Re-export for convenience
pub use job::{DownloadJob, DownloadOutcome, DownloadRequest, DownloadSpec};
pub use progress::{DownloadProgress, DownloadStatus, ProgressRegistry, ProgressTracker};
