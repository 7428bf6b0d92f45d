//! Shared application state.

use std::sync::Arc;

use crate::downloader::{DownloadJob, ProgressRegistry};
use crate::extractor::Extractor;
use crate::picker::FolderPicker;
use crate::utils::AppSettings;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
    pub picker: Arc<dyn FolderPicker>,
    pub progress: ProgressRegistry,
    pub settings: Arc<AppSettings>,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        picker: Arc<dyn FolderPicker>,
        settings: AppSettings,
    ) -> Self {
        Self {
            extractor,
            picker,
            progress: ProgressRegistry::new(),
            settings: Arc::new(settings),
        }
    }

    pub fn download_job(&self) -> DownloadJob {
        DownloadJob::new(self.extractor.clone(), self.settings.clone())
    }
}
