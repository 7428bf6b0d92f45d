//! Rustloader Web - local video downloader front-end
//!
//! Serves a small browser UI on the loopback interface. Metadata lookups
//! and downloads are delegated to yt-dlp (and ffmpeg for mp3 conversion).

use anyhow::Result;
use clap::Parser;
use rustloader_web::api::{self, AppState};
use rustloader_web::extractor::{summarize, Extractor, ExtractorOptions, YtDlpExtractor};
use rustloader_web::picker::NativeFolderPicker;
use rustloader_web::utils::AppSettings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Port on 127.0.0.1 to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    ytdlp: Option<PathBuf>,

    /// ffmpeg binary or directory handed to yt-dlp
    #[arg(long)]
    ffmpeg_location: Option<PathBuf>,

    /// Print the format summary for a URL and exit
    #[arg(long)]
    info: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rustloader_web=info,tower_http=info")),
        )
        .init();

    let mut settings = AppSettings::from_env_or_default();
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(path) = args.ytdlp {
        settings.ytdlp_path = Some(path);
    }
    if let Some(path) = args.ffmpeg_location {
        settings.ffmpeg_location = Some(path);
    }

    let extractor = match YtDlpExtractor::new(settings.ytdlp_path.as_deref()) {
        Ok(extractor) => extractor,
        Err(e) => {
            // Keep serving the UI; lookups will report the failure
            eprintln!("WARNING: {}", e);
            eprintln!("The server will run, but video extraction will fail.");
            eprintln!("Please install yt-dlp:");
            eprintln!("  pip install yt-dlp");
            eprintln!("  or: brew install yt-dlp");
            eprintln!("  or visit: https://github.com/yt-dlp/yt-dlp");
            YtDlpExtractor::with_path("yt-dlp")
        }
    };

    if let Some(url) = args.info {
        return print_info(&extractor, &settings, &url).await;
    }

    let state = AppState::new(
        Arc::new(extractor),
        Arc::new(NativeFolderPicker::new()),
        settings,
    );
    api::serve(state).await
}

/// Headless lookup, handy for checking a yt-dlp install
async fn print_info(extractor: &YtDlpExtractor, settings: &AppSettings, url: &str) -> Result<()> {
    let options = ExtractorOptions::new(settings);
    let info = extractor.extract_info(url, &options).await?;
    let summary = summarize(&info);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
