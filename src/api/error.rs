use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::{info, warn};

use super::models::{Envelope, ErrorDetail};
use super::response::respond;
use crate::fetcher::FetchError;
use crate::store::StoreError;

/// Request failures.
///
/// The wrapped cause is only logged; clients see the stable
/// [`code`](ApiError::code) and [`description`](ApiError::description).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to read request body: {0}")]
    ReadBody(String),
    #[error("failed to decode request body: {0}")]
    Unmarshal(#[from] serde_json::Error),
    #[error("failed to save file: {0}")]
    SaveFile(#[from] FetchError),
    #[error("failed to insert image record: {0}")]
    InsertDb(#[source] StoreError),
    #[error("failed to query image records: {0}")]
    GetDb(#[source] StoreError),
    #[error("image {0} not found")]
    NotFound(i64),
    #[error("invalid image id: {0:?}")]
    Parsing(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ReadBody(_) => "FailedReadData",
            ApiError::Unmarshal(_) => "FailedUnmarshal",
            ApiError::SaveFile(_) => "FailedSaveFile",
            ApiError::InsertDb(_) => "FailedInsertDb",
            ApiError::GetDb(_) => "FailedGetDb",
            ApiError::NotFound(_) => "RecordNotFound",
            ApiError::Parsing(_) => "FailedParsing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ApiError::ReadBody(_) => "Failed to read data",
            ApiError::Unmarshal(_) => "Failed to unmarshal data",
            ApiError::SaveFile(_) => "Failed to save file to storage",
            ApiError::InsertDb(_) => "Failed to insert data to database",
            ApiError::GetDb(_) => "Failed to get data from database",
            ApiError::NotFound(_) => "Record not found in database",
            ApiError::Parsing(_) => "Failed to parse parameter",
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            code: self.code().to_string(),
            desc: self.description().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        match &self {
            ApiError::NotFound(_) | ApiError::Parsing(_) => {
                info!(code = self.code(), error = %self, "Request rejected")
            }
            _ => warn!(code = self.code(), error = %self, "Request failed"),
        }

        respond(status, &Envelope::<()>::Failure(self.detail()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_errors() -> Vec<ApiError> {
        vec![
            ApiError::ReadBody("stream closed".into()),
            ApiError::Unmarshal(serde_json::from_str::<u8>("{").unwrap_err()),
            ApiError::SaveFile(FetchError::NonSuccessStatus(500)),
            ApiError::InsertDb(StoreError::Unavailable("down".into())),
            ApiError::GetDb(StoreError::Unavailable("down".into())),
            ApiError::NotFound(15),
            ApiError::Parsing("'1'".into()),
        ]
    }

    #[test]
    fn test_codes_are_stable() {
        let codes: Vec<_> = all_errors().iter().map(ApiError::code).collect();
        assert_eq!(
            codes,
            vec![
                "FailedReadData",
                "FailedUnmarshal",
                "FailedSaveFile",
                "FailedInsertDb",
                "FailedGetDb",
                "RecordNotFound",
                "FailedParsing",
            ]
        );
    }

    #[test]
    fn test_only_not_found_is_404() {
        for err in all_errors() {
            let expected = if matches!(err, ApiError::NotFound(_)) {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::BAD_REQUEST
            };
            assert_eq!(err.status_code(), expected, "{}", err.code());
        }
    }

    #[test]
    fn test_detail_hides_cause() {
        let err = ApiError::SaveFile(FetchError::NonSuccessStatus(503));

        assert!(err.to_string().contains("503"));
        assert_eq!(
            err.detail(),
            ErrorDetail {
                code: "FailedSaveFile".to_string(),
                desc: "Failed to save file to storage".to_string(),
            }
        );
    }
}
