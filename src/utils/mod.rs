//! Utility modules for error handling and configuration

pub mod config;
pub mod error;
pub mod platform;

// Re-export for convenience
pub use config::AppSettings;
pub use error::RustloaderError;
pub use platform::default_download_dir;
