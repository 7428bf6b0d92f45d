use crate::extractor::models::VideoInfo;
use crate::extractor::options::ExtractorOptions;
use anyhow::Result;
use async_trait::async_trait;

/// Media extraction backend
///
/// This trait isolates the web layer from the specific extraction tool, so
/// handlers can be exercised without spawning yt-dlp.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Extracts video information without downloading anything
    async fn extract_info(&self, url: &str, options: &ExtractorOptions) -> Result<VideoInfo>;

    /// Downloads media into the location named by `options.output_template`,
    /// reporting progress through `options.progress_hook`.
    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<()>;
}
