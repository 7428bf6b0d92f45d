//! Platform-specific directories

use std::path::PathBuf;
use tracing::warn;

/// Returns the user's Downloads directory
/// - All platforms: ~/Downloads, falling back to home, then the system temp dir
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| {
            warn!("Could not determine Downloads directory, using temp dir");
            std::env::temp_dir()
        })
}
