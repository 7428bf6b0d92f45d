//! Test doubles for the extractor and folder picker.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use rustloader_web::downloader::{DownloadProgress, ProgressRegistry};
use rustloader_web::extractor::{Extractor, ExtractorOptions, Format, ProgressEvent, VideoInfo};
use rustloader_web::picker::FolderPicker;
use rustloader_web::utils::{AppSettings, RustloaderError};
use rustloader_web::AppState;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// What the fake does when asked to download
#[derive(Debug, Clone)]
pub enum DownloadBehavior {
    /// Emit the events, then write `name` into the scratch directory
    Produce { name: String, events: Vec<ProgressEvent> },
    /// Emit the events and exit successfully without producing a file
    ProduceNothing { events: Vec<ProgressEvent> },
    /// Fail like yt-dlp would
    Fail(String),
}

pub struct FakeExtractor {
    info: Option<VideoInfo>,
    behavior: DownloadBehavior,
    pub info_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub scratch_dirs: Mutex<Vec<PathBuf>>,
    pub formats_requested: Mutex<Vec<Option<String>>>,
    observer: Mutex<Option<ProgressRegistry>>,
    pub observed: Mutex<Vec<DownloadProgress>>,
}

impl FakeExtractor {
    pub fn new(info: Option<VideoInfo>, behavior: DownloadBehavior) -> Self {
        Self {
            info,
            behavior,
            info_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            scratch_dirs: Mutex::new(Vec::new()),
            formats_requested: Mutex::new(Vec::new()),
            observer: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Downloads a file called `name` after a few progress updates
    pub fn producing(name: &str) -> Self {
        Self::new(
            None,
            DownloadBehavior::Produce {
                name: name.to_string(),
                events: standard_events(),
            },
        )
    }

    /// Snapshot the latest progress of `registry` around every event
    pub fn observe(&self, registry: ProgressRegistry) {
        *self.observer.lock().unwrap() = Some(registry);
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        if let Some(registry) = self.observer.lock().unwrap().as_ref() {
            self.observed.lock().unwrap().push(registry.latest());
        }
    }

    fn emit(&self, options: &ExtractorOptions, events: &[ProgressEvent]) {
        self.record();
        if let Some(hook) = &options.progress_hook {
            for event in events {
                hook(event);
                self.record();
            }
        }
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn extract_info(&self, _url: &str, _options: &ExtractorOptions) -> Result<VideoInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        match &self.info {
            Some(info) => Ok(info.clone()),
            None => Err(RustloaderError::Extraction("ERROR: Unsupported URL".into()).into()),
        }
    }

    async fn download(&self, _url: &str, options: &ExtractorOptions) -> Result<()> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.formats_requested
            .lock()
            .unwrap()
            .push(options.format.clone());

        let dir = options
            .output_template
            .as_deref()
            .and_then(Path::parent)
            .expect("download without output template")
            .to_path_buf();
        self.scratch_dirs.lock().unwrap().push(dir.clone());

        match &self.behavior {
            DownloadBehavior::Produce { name, events } => {
                tokio::fs::write(dir.join(format!("{}.part", name)), b"partial").await?;
                self.emit(options, events);
                tokio::fs::remove_file(dir.join(format!("{}.part", name))).await?;
                tokio::fs::write(dir.join(name), b"media bytes").await?;
                Ok(())
            }
            DownloadBehavior::ProduceNothing { events } => {
                self.emit(options, events);
                Ok(())
            }
            DownloadBehavior::Fail(msg) => {
                tokio::fs::write(dir.join("leftover.mp4.part"), b"x").await?;
                Err(RustloaderError::Download(msg.clone()).into())
            }
        }
    }
}

pub fn standard_events() -> Vec<ProgressEvent> {
    vec![
        ProgressEvent::Downloading {
            downloaded_bytes: 0,
            total_bytes: None,
            total_bytes_estimate: None,
        },
        ProgressEvent::Downloading {
            downloaded_bytes: 250,
            total_bytes: None,
            total_bytes_estimate: Some(1000),
        },
        ProgressEvent::Downloading {
            downloaded_bytes: 700,
            total_bytes: Some(1000),
            total_bytes_estimate: None,
        },
        ProgressEvent::Downloading {
            downloaded_bytes: 1000,
            total_bytes: Some(1000),
            total_bytes_estimate: None,
        },
        ProgressEvent::Finished,
    ]
}

#[derive(Debug, Clone)]
pub enum PickerBehavior {
    Pick(PathBuf),
    Cancel,
    Fail,
}

pub struct FakePicker(pub PickerBehavior);

#[async_trait]
impl FolderPicker for FakePicker {
    async fn pick_folder(&self) -> Result<Option<PathBuf>, RustloaderError> {
        match &self.0 {
            PickerBehavior::Pick(path) => Ok(Some(path.clone())),
            PickerBehavior::Cancel => Ok(None),
            PickerBehavior::Fail => Err(RustloaderError::Dialog("no display available".into())),
        }
    }
}

/// A router wired to fakes, with scratch directories under `temp_root`
pub struct TestApp {
    pub state: AppState,
    pub extractor: Arc<FakeExtractor>,
    pub temp_root: TempDir,
}

impl TestApp {
    pub fn new(extractor: FakeExtractor, picker: PickerBehavior) -> Self {
        let temp_root = TempDir::new().expect("temp root");
        let settings = AppSettings {
            temp_root: Some(temp_root.path().to_path_buf()),
            ..Default::default()
        };
        let extractor = Arc::new(extractor);
        let state = AppState::new(extractor.clone(), Arc::new(FakePicker(picker)), settings);
        extractor.observe(state.progress.clone());
        Self {
            state,
            extractor,
            temp_root,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        rustloader_web::api::router(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> (u16, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        read_json(self.send(request).await).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        read_json(self.send(request).await).await
    }

    /// Entries left behind in the scratch root
    pub fn scratch_leftovers(&self) -> usize {
        std::fs::read_dir(self.temp_root.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub async fn read_json(response: Response<Body>) -> (u16, serde_json::Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

pub fn muxed(id: &str, height: u32) -> Format {
    Format {
        format_id: id.to_string(),
        ext: Some("mp4".to_string()),
        vcodec: Some("avc1.4d401e".to_string()),
        acodec: Some("mp4a.40.2".to_string()),
        width: Some(height * 16 / 9),
        height: Some(height),
        fps: Some(30.0),
        filesize: Some(10_000.0),
        ..Default::default()
    }
}

pub fn audio_only(id: &str, abr: f64) -> Format {
    Format {
        format_id: id.to_string(),
        ext: Some("webm".to_string()),
        vcodec: Some("none".to_string()),
        acodec: Some("opus".to_string()),
        abr: Some(abr),
        ..Default::default()
    }
}

pub fn sample_info(formats: Vec<Format>) -> VideoInfo {
    VideoInfo {
        title: Some("Sample Video".to_string()),
        thumbnail: Some("https://example.com/thumb.jpg".to_string()),
        duration: Some(61.0),
        uploader: Some("Uploader".to_string()),
        view_count: Some(1234),
        formats,
        ..Default::default()
    }
}
