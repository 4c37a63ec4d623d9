//! API utility functions
//!
//! Pure helpers for request processing, kept out of the handlers so they can
//! be unit tested on their own.

use std::path::{Path, PathBuf};

use axum::body::{Body, Bytes};
use http_body_util::{BodyExt, Limited};

use crate::api::error::ApiError;

/// Collect the request body, failing once it grows past `max_size` bytes
pub async fn read_body(body: Body, max_size: usize) -> Result<Bytes, ApiError> {
    let collected = Limited::new(body, max_size)
        .collect()
        .await
        .map_err(|err| ApiError::ReadBody(err.to_string()))?;

    Ok(collected.to_bytes())
}

/// Parse an image id path parameter as a base-10 integer
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::Parsing(raw.to_string()))
}

/// Location of a downloaded file inside the download directory
pub fn target_path(download_dir: &Path, file_name: &str) -> PathBuf {
    download_dir.join(file_name)
}
