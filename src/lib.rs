//! Rustloader Web library

pub mod api;
pub mod downloader;
pub mod extractor;
pub mod picker;
pub mod utils;

// Re-export main types for easier use
pub use api::AppState;
pub use downloader::{DownloadJob, DownloadProgress, DownloadStatus, ProgressRegistry};
pub use extractor::{Extractor, ExtractorOptions, MediaSummary, VideoInfo, YtDlpExtractor};
pub use picker::{FolderPicker, NativeFolderPicker};
pub use utils::{AppSettings, RustloaderError};
