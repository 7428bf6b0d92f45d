//! Error handling for Rustloader Web

use thiserror::Error;

/// Main error type for Rustloader Web
#[derive(Debug, Error)]
pub enum RustloaderError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Failed to extract video info: {0}")]
    Extraction(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Post-processing failed: {0}")]
    PostProcess(String),

    #[error("Folder dialog failed: {0}")]
    Dialog(String),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RustloaderError {
    /// Recover a typed error from a failed extractor download, wrapping
    /// anything else as a download error.
    pub fn from_download(err: anyhow::Error) -> Self {
        match err.downcast::<RustloaderError>() {
            Ok(typed) => typed,
            Err(other) => RustloaderError::Download(format!("{:#}", other)),
        }
    }

    /// True for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RustloaderError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_download_keeps_typed_error() {
        let err = anyhow::Error::from(RustloaderError::YtDlpNotFound);
        assert!(matches!(
            RustloaderError::from_download(err),
            RustloaderError::YtDlpNotFound
        ));
    }

    #[test]
    fn test_from_download_wraps_untyped_error() {
        let err = anyhow::anyhow!("HTTP Error 403: Forbidden");
        match RustloaderError::from_download(err) {
            RustloaderError::Download(msg) => assert!(msg.contains("403")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_download_message_does_not_mention_info() {
        let msg = RustloaderError::Download("HTTP Error 403: Forbidden".into()).to_string();
        assert_eq!(msg, "Download failed: HTTP Error 403: Forbidden");
    }

    #[test]
    fn test_validation_is_client_error() {
        assert!(RustloaderError::Validation("missing url".into()).is_client_error());
        assert!(!RustloaderError::PostProcess("no file".into()).is_client_error());
    }
}
