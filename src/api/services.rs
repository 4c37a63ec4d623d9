use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tokio::time::{Instant, timeout_at};
use tracing::info;

use super::{
    error::ApiError,
    models::{DownloadRequest, HealthResponse, Image},
    response::ApiSuccess,
    state::AppState,
    utils::{parse_id, read_body, target_path},
};
use crate::fetcher::{self, FetchError};
use crate::store::{NewImage, StoreError};

/// Download endpoint (POST /download-image/)
///
/// ## Flow:
/// 1. Read the body (bounded by `server.max_body_bytes`) and decode `{"url": ...}`
/// 2. Derive the file name from the URL's last path segment
/// 3. Fetch the URL into `<download_dir>/<file_name>`
/// 4. Insert the image record
/// 5. Return 200 with the inserted record
///
/// Steps 3 and 4 share one deadline (`server.request_deadline_secs`).
/// No record is written unless the file was fully saved.
pub async fn download_image(
    State(state): State<AppState>,
    body: axum::body::Body,
) -> Result<ApiSuccess<Image>, ApiError> {
    let body_bytes = read_body(body, state.config.server.max_body_bytes).await?;
    let request: DownloadRequest = serde_json::from_slice(&body_bytes)?;

    let deadline = Instant::now() + state.config.server.request_deadline();

    match save_image(&state, &request.url, deadline).await {
        Ok((image, size)) => {
            state.metrics.download_succeeded(size);
            info!(id = image.id, url = %image.source_url, path = %image.file_path, size, "Image downloaded");
            Ok(ApiSuccess(image))
        }
        Err(err) => {
            state.metrics.download_failed();
            Err(err)
        }
    }
}

/// Fetch then insert, both bounded by `deadline`. Returns the record and bytes written.
async fn save_image(
    state: &AppState,
    url: &str,
    deadline: Instant,
) -> Result<(Image, u64), ApiError> {
    let file_name = fetcher::file_name_from_url(url)?;
    let path = target_path(&state.config.storage.download_dir, &file_name);

    let fetched = timeout_at(deadline, state.fetcher.fetch(url, &path))
        .await
        .map_err(|_| FetchError::DeadlineExceeded)??;

    let record = NewImage {
        file_name,
        file_path: fetched.path.to_string_lossy().into_owned(),
        source_url: url.to_string(),
    };

    // a statement cancelled here may already have committed its row
    let image = timeout_at(deadline, state.store.insert(record))
        .await
        .map_err(|_| ApiError::InsertDb(StoreError::Unavailable("request deadline exceeded".into())))?
        .map_err(ApiError::InsertDb)?;

    Ok((image, fetched.size))
}

/// List endpoint (GET /download-image/)
///
/// An empty table is a success with `data: []`.
pub async fn list_images(State(state): State<AppState>) -> Result<ApiSuccess<Vec<Image>>, ApiError> {
    let images = state.store.list().await.map_err(ApiError::GetDb)?;
    Ok(ApiSuccess(images))
}

/// Lookup endpoint (GET /download-image/{id})
///
/// 400 `FailedParsing` for a non-integer id, 404 `RecordNotFound` for an
/// unknown one.
pub async fn get_image(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<Image>, ApiError> {
    let Path(raw_id) = id.map_err(|rejection| ApiError::Parsing(rejection.body_text()))?;
    let id = parse_id(&raw_id)?;

    let image = state.store.get(id).await.map_err(|err| match err {
        StoreError::NotFound(id) => ApiError::NotFound(id),
        other => ApiError::GetDb(other),
    })?;

    Ok(ApiSuccess(image))
}

/// Health check endpoint (GET /health)
///
/// Returns 503 Service Unavailable when the database does not answer.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());

    let database = if state.store.health().await {
        "healthy"
    } else {
        "unhealthy"
    };
    components.insert("database".to_string(), database.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let (status_code, overall_status) = if all_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
        downloads: state.metrics.snapshot(),
    };

    (status_code, Json(response))
}
