//! Native folder picker

use crate::utils::{default_download_dir, RustloaderError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

const DIALOG_TITLE: &str = "Selecciona dónde guardar el archivo";

/// Asks the user for a destination folder
#[async_trait]
pub trait FolderPicker: Send + Sync {
    /// `Ok(None)` means the user cancelled
    async fn pick_folder(&self) -> Result<Option<PathBuf>, RustloaderError>;
}

/// OS directory chooser via rfd
#[derive(Debug, Clone, Default)]
pub struct NativeFolderPicker {
    pub start_dir: Option<PathBuf>,
}

impl NativeFolderPicker {
    pub fn new() -> Self {
        Self {
            start_dir: Some(default_download_dir()),
        }
    }
}

#[async_trait]
impl FolderPicker for NativeFolderPicker {
    async fn pick_folder(&self) -> Result<Option<PathBuf>, RustloaderError> {
        let start_dir = self.start_dir.clone();

        // The dialog blocks until the user answers, so keep it off the runtime
        let picked = tokio::task::spawn_blocking(move || {
            let mut dialog = rfd::FileDialog::new().set_title(DIALOG_TITLE);
            if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
                dialog = dialog.set_directory(dir);
            }
            dialog.pick_folder()
        })
        .await
        .map_err(|e| RustloaderError::Dialog(e.to_string()))?;

        // Only existing directories are accepted
        let picked = picked.filter(|p| p.is_dir());
        debug!("Folder picker returned {:?}", picked);
        Ok(picked)
    }
}
