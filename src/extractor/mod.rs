pub mod formats;
pub mod models;
pub mod options;
pub mod traits;
pub mod ytdlp;

pub use formats::{summarize, AudioFormat, MediaSummary, VideoFormat};
pub use models::{Format, ProgressEvent, VideoInfo};
pub use options::{ExtractorOptions, MediaKind, ProgressHook};
pub use traits::Extractor;
pub use ytdlp::YtDlpExtractor;
