//! Request handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::assets;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::downloader::{DownloadProgress, DownloadRequest};
use crate::extractor::{summarize, ExtractorOptions, MediaSummary};

const INFO_FAILED: &str = "Error al obtener información del video";
const NO_FOLDER: &str = "No se seleccionó carpeta";

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: MediaSummary,
}

#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub path: String,
    pub download_id: Uuid,
}

pub async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        assets::SCRIPT_JS,
    )
}

pub async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], assets::STYLE_CSS)
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "extractor": state.extractor.id(),
    }))
}

/// `POST /api/video-info`
///
/// Extraction failures are logged in full but reported with a fixed message.
pub async fn video_info(
    State(state): State<AppState>,
    payload: Result<Json<InfoRequest>, JsonRejection>,
) -> ApiResult<Json<InfoResponse>> {
    let Json(request) = payload?;
    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL no proporcionada"))?;

    let options = ExtractorOptions::new(&state.settings);
    let info = state
        .extractor
        .extract_info(url, &options)
        .await
        .map_err(|e| {
            error!("Error: {:#}", e);
            ApiError::internal(INFO_FAILED)
        })?;

    let summary = summarize(&info);
    info!(
        "[{}] {}: {} video / {} audio formats",
        info.extractor.as_deref().unwrap_or("unknown"),
        summary.title,
        summary.video_formats.len(),
        summary.audio_formats.len()
    );

    Ok(Json(InfoResponse {
        success: true,
        summary,
    }))
}

/// `GET /api/select-folder`
pub async fn select_folder(State(state): State<AppState>) -> Response {
    match state.picker.pick_folder().await {
        Ok(Some(path)) => Json(FolderResponse {
            success: true,
            path: Some(path.to_string_lossy().into_owned()),
            message: None,
        })
        .into_response(),
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(FolderResponse {
                success: false,
                path: None,
                message: Some(NO_FOLDER.to_string()),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Folder picker failed: {}", e);
            ApiError::internal(e.to_string()).into_response()
        }
    }
}

/// `GET /api/progress[?id=<download id>]`
///
/// Without an id, reports the most recent download. Never fails.
pub async fn progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Json<DownloadProgress> {
    let snapshot = match query.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => state.progress.latest(),
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => state.progress.snapshot(&id),
            Err(_) => DownloadProgress::default(),
        },
    };
    Json(snapshot)
}

/// `POST /api/download`
///
/// Error responses include the underlying cause so the user can act on it.
pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> ApiResult<Json<DownloadResponse>> {
    let Json(request) = payload?;

    let download_id = request.download_id.unwrap_or_else(Uuid::new_v4);
    let tracker = state.progress.begin(download_id);

    let spec = match request.validate() {
        Ok(spec) => spec,
        Err(e) => {
            tracker.fail();
            return Err(e.into());
        }
    };

    // Run detached so a dropped connection can't abort the download midway
    let job = state.download_job();
    let task_tracker = tracker.clone();
    let handle = tokio::spawn(async move { job.run(&spec, &task_tracker).await });

    let outcome = match handle.await {
        Ok(result) => result,
        Err(e) => {
            warn!("Download task did not finish: {}", e);
            tracker.fail();
            return Err(ApiError::internal(format!("Error al descargar: {}", e)));
        }
    };

    match outcome {
        Ok(outcome) => Ok(Json(DownloadResponse {
            success: true,
            message: "Descarga completada".to_string(),
            filename: outcome.filename,
            path: outcome.path,
            download_id,
        })),
        Err(e) => Err(ApiError::internal(format!("Error al descargar: {}", e))),
    }
}
