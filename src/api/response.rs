//! Envelope → HTTP response encoding

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use super::models::Envelope;

/// Plain-text body used when the envelope itself cannot be serialized
pub const UNKNOWN_ERROR_BODY: &str = "unknown error";

/// Successful handler output, sent as `200 {success:true, data, error:null}`
#[derive(Debug)]
pub struct ApiSuccess<T>(pub T);

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        respond(StatusCode::OK, &Envelope::Success(self.0))
    }
}

/// Serialize `envelope` as JSON with `status`.
///
/// Falls back to `400 unknown error` in plain text if serialization fails.
pub fn respond<T: Serialize>(status: StatusCode, envelope: &Envelope<T>) -> Response {
    match serde_json::to_vec(envelope) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to serialize response envelope");
            (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
                UNKNOWN_ERROR_BODY,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ErrorDetail;
    use std::collections::HashMap;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_success_response() {
        let response = ApiSuccess(vec![1, 2, 3]).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(
            body_string(response).await,
            r#"{"success":true,"data":[1,2,3],"error":null}"#
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_status() {
        let envelope: Envelope<()> = Envelope::Failure(ErrorDetail {
            code: "RecordNotFound".to_string(),
            desc: "Record not found in database".to_string(),
        });

        let response = respond(StatusCode::NOT_FOUND, &envelope);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_string(response).await,
            r#"{"success":false,"data":null,"error":{"code":"RecordNotFound","desc":"Record not found in database"}}"#
        );
    }

    #[tokio::test]
    async fn test_unserializable_payload_falls_back_to_plain_text() {
        // JSON object keys must be strings
        let mut data = HashMap::new();
        data.insert((1u8, 2u8), 3u8);

        let response = ApiSuccess(data).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        assert_eq!(body_string(response).await, UNKNOWN_ERROR_BODY);
    }
}
