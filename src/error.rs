//! # Error Types
//!
//! Every failure the SDK can report, classified by when it happens:
//!
//! - Construction: `InvalidUrl`, `InvalidAuth`, `UnknownRegion`, `Config`
//! - Pre-flight (no I/O performed): `MissingOptions`, `MissingRequiredField`,
//!   `ServiceUrlMissing`, `InvalidPathParameter`, `InvalidHeader`, `InvalidModel`
//! - In flight: `Transport`, `DeadlineExceeded`, `Canceled`
//! - Response: `Decode`, `InvalidResponse`, `Http`
//!
//! Only the response kinds carry the raw response.

use crate::response::RawResponse;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result alias used across the SDK
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The operation was invoked without its options object
    #[error("options are required for operation {operation}")]
    MissingOptions { operation: &'static str },

    #[error("missing required field: {name}")]
    MissingRequiredField { name: &'static str },

    #[error("invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid authenticator: {0}")]
    InvalidAuth(String),

    #[error("service URL for region '{0}' not found")]
    UnknownRegion(String),

    /// External configuration could not be read
    #[error("configuration error: {0}")]
    Config(String),

    #[error("service URL is not set")]
    ServiceUrlMissing,

    #[error("path parameter '{name}' must not be empty")]
    InvalidPathParameter { name: String },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    /// An additional property shadows a declared field of the model
    #[error("additional property '{key}' collides with a declared field of {model}")]
    InvalidModel { model: &'static str, key: String },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("context canceled")]
    Canceled,

    /// Body was not JSON, or was malformed JSON. For a non-JSON body the
    /// message is the body text.
    #[error("{message}")]
    Decode {
        message: String,
        response: Option<Box<RawResponse>>,
    },

    /// Well-formed JSON that does not match the declared result type
    #[error("invalid response: {message}")]
    InvalidResponse {
        message: String,
        response: Option<Box<RawResponse>>,
    },

    /// Non-2xx status. Displays as the status phrase.
    #[error("{}", .0.phrase)]
    Http(Box<HttpError>),
}

impl Error {
    /// Raw response attached to the error, if the server answered
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Error::Http(http) => Some(&http.response),
            Error::Decode { response, .. } | Error::InvalidResponse { response, .. } => {
                response.as_deref()
            }
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.response().map(RawResponse::status)
    }

    /// Raised before any request was transmitted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingOptions { .. }
                | Error::MissingRequiredField { .. }
                | Error::ServiceUrlMissing
                | Error::InvalidPathParameter { .. }
                | Error::InvalidHeader { .. }
                | Error::InvalidModel { .. }
        )
    }
}

/// Details of a non-2xx response
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    /// Canonical reason phrase, e.g. `Conflict`
    pub phrase: String,
    /// Body parsed as JSON when possible
    pub body: Option<Value>,
    pub response: RawResponse,
}

impl HttpError {
    pub(crate) fn from_response(response: RawResponse) -> Self {
        let status = response.status();
        let phrase = status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string);
        let body = serde_json::from_slice(response.body()).ok();
        Self {
            status,
            phrase,
            body,
            response,
        }
    }

    /// Message reported by the server, if the body follows a known error shape
    ///
    /// Recognizes the collection envelope (`resources[0].error_message`) and the
    /// `errors[0].message` list.
    pub fn server_message(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        body.pointer("/resources/0/error_message")
            .or_else(|| body.pointer("/errors/0/message"))
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        Error::Http(Box::new(err))
    }
}
