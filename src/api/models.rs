//! Wire types for the image download API.
//!
//! Every endpoint answers with an [`Envelope`]:
//!
//! ```json
//! {"success":true,"data":{"id":1,"file_name":"pic.png","file_path":"images/pic.png","source_url":"https://example.com/a/pic.png"},"error":null}
//! {"success":false,"data":null,"error":{"code":"RecordNotFound","desc":"Record not found in database"}}
//! ```

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use crate::observability::MetricsSnapshot;

pub use crate::store::Image;

/// Body of `POST /download-image/`
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
}

/// Client-facing failure detail: a stable code and a fixed description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub desc: String,
}

/// Uniform response wrapper.
///
/// Serializes as `{success, data, error}` with the unused member set to `null`.
#[derive(Debug, Clone)]
pub enum Envelope<T> {
    Success(T),
    Failure(ErrorDetail),
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 3)?;
        match self {
            Envelope::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.serialize_field("error", &Option::<ErrorDetail>::None)?;
            }
            Envelope::Failure(detail) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("data", &Option::<()>::None)?;
                state.serialize_field("error", detail)?;
            }
        }
        state.end()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
    pub downloads: MetricsSnapshot,
}
