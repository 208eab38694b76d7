//! # Error Responses
//!
//! Errors use the collection envelope with the cloud error media type:
//!
//! ```json
//! {"metadata": {"collection_type": "application/vnd.ibm.cloud.error+json", "collection_total": 1},
//!  "resources": [{"error_message": "..."}]}
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::fmt;

pub const ERROR_COLLECTION_TYPE: &str = "application/vnd.ibm.cloud.error+json";

/// A failed request: status plus the message placed in the error envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "metadata": {
                "collection_type": ERROR_COLLECTION_TYPE,
                "collection_total": 1
            },
            "resources": [{"error_message": message}]
        })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status, &self.message)
    }
}
