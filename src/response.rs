//! # Response Decoding
//!
//! Turns a raw transport response into a typed result:
//!
//! 1. Non-2xx → [`Error::Http`] with the raw response attached.
//! 2. No-body endpoints accept any 2xx and discard the body.
//! 3. Typed endpoints require a JSON content type, then decode through the
//!    operation's declared result type.

use crate::error::{Error, HttpError, Result};
use crate::operation::Operation;
use paths::ResponseBody;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

/// Response as received from the transport, body fully read
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self::new(status, headers, body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether `Content-Type` names JSON (`application/json` or a `+json` media type)
    pub fn is_json(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|mime| {
                let mime = mime.trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }
}

/// A typed result together with the response it was decoded from
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    pub result: T,
    pub response: RawResponse,
}

impl<T> DetailedResponse<T> {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn into_result(self) -> T {
        self.result
    }
}

/// Decode `raw` as the result of `operation`
pub(crate) fn decode<O: Operation>(
    operation: &O,
    raw: RawResponse,
) -> Result<DetailedResponse<O::Output>> {
    if !raw.status().is_success() {
        debug!(
            status = raw.status().as_u16(),
            "secrets_manager.response.error_status"
        );
        return Err(HttpError::from_response(raw).into());
    }

    let body = match operation.endpoint().response_body() {
        ResponseBody::Empty => None,
        ResponseBody::Json => {
            if !raw.is_json() {
                return Err(Error::Decode {
                    message: raw.text(),
                    response: Some(Box::new(raw)),
                });
            }
            match serde_json::from_slice::<Value>(raw.body()) {
                Ok(value) => Some(value),
                Err(e) => {
                    return Err(Error::Decode {
                        message: format!("invalid JSON in response body: {e}"),
                        response: Some(Box::new(raw)),
                    })
                }
            }
        }
    };

    match operation.decode(body) {
        Ok(result) => Ok(DetailedResponse {
            result,
            response: raw,
        }),
        Err(e) => Err(Error::InvalidResponse {
            message: e.to_string(),
            response: Some(Box::new(raw)),
        }),
    }
}
