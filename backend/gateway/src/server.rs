//! Main HTTP Gateway Server.
//!
//! Serves the upload page plus the JSON API driving it: batch upload through
//! the upload surface, gallery listing, preview bytes, positional removal,
//! bulk clear, and the extract action.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use uuid::Uuid;

use postlens_core::{ExtractionResult, RawUpload, StagedImageMeta};
use postlens_staging::{BatchOutcome, StagingStore, UploadSurface};
use postlens_understanding::{ExtractionClient, ImageInput};

use crate::ui;

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StagingStore>,
    pub surface: Arc<UploadSurface>,
    pub client: Arc<ExtractionClient>,
}

/// Request-body ceiling for the upload route. Roomy enough for a batch of
/// several ceiling-sized files plus multipart framing; the per-file size
/// ceiling is still enforced by validation.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Build the Axum router with the upload page and all API routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(ui::ui_router())
        .route("/api/health", get(health))
        .route("/api/images", post(upload_images).get(list_images))
        .route("/api/images/clear", post(clear_images))
        .route("/api/images/{index}", delete(remove_image))
        .route("/api/previews/{id}", get(preview))
        .route("/api/extract", post(extract))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state);
    info!("Gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "postlens",
        "version": env!("CARGO_PKG_VERSION"),
        "time": Utc::now().to_rfc3339(),
    }))
}

/// Batch upload: every multipart field is one raw file, validated and staged
/// in field order by the upload surface.
async fn upload_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchOutcome>, StatusCode> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| {
            warn!(error = %err, "Malformed multipart upload");
            StatusCode::BAD_REQUEST
        })?
    {
        let filename = field.file_name().unwrap_or("upload").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|err| {
            warn!(error = %err, "Failed reading multipart field");
            StatusCode::BAD_REQUEST
        })?;
        files.push(RawUpload::new(filename, media_type, bytes));
    }

    Ok(Json(state.surface.handle_raw_input(files).await))
}

async fn list_images(State(state): State<AppState>) -> Json<Vec<StagedImageMeta>> {
    Json(state.store.metas())
}

async fn preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.preview(id) {
        Some(preview) => (
            [(header::CONTENT_TYPE, preview.media_type)],
            preview.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Positional removal; the path segment is the image's current rendered index.
async fn remove_image(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> StatusCode {
    match state.surface.remove(index) {
        Some(id) => {
            info!(%id, index, "Removed staged image");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn clear_images(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cleared = state.store.clear_images();
    Json(serde_json::json!({ "cleared": cleared }))
}

/// Run extraction over everything currently staged, then clear staging
/// regardless of outcome.
async fn extract(State(state): State<AppState>) -> Json<Vec<ExtractionResult>> {
    let inputs: Vec<ImageInput> = state
        .store
        .snapshot_files()
        .into_iter()
        .map(|(media_type, bytes)| ImageInput { media_type, bytes })
        .collect();

    if inputs.is_empty() {
        info!("Extract requested with nothing staged");
        return Json(Vec::new());
    }

    let results = state.client.process(inputs).await;
    for (position, result) in results.iter().enumerate() {
        if result.success {
            info!(position, "Extraction succeeded");
        } else {
            error!(
                position,
                error = result.error.as_deref().unwrap_or("unknown"),
                "Extraction failed"
            );
        }
    }

    // Guaranteed cleanup path: staging never survives an extract action.
    state.store.clear_images();
    Json(results)
}
