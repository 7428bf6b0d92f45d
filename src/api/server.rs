//! API server setup.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::routes;
use crate::api::state::AppState;

/// Build the full router: UI assets plus the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/static/script.js", get(routes::script))
        .route("/static/style.css", get(routes::style))
        .route("/api/health", get(routes::health))
        .route("/api/video-info", post(routes::video_info))
        .route("/api/select-folder", get(routes::select_folder))
        .route("/api/progress", get(routes::progress))
        .route("/api/download", post(routes::download))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve on the loopback address from the settings until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Rustloader Web listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
