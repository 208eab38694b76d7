//! # Operations
//!
//! Each options type describes one endpoint: where it lives, what it sends and
//! how its response decodes. [`crate::SecretsManager::send`] drives every
//! operation through the same validate → build → execute → decode path.

use crate::error::{Error, Result};
use paths::SecretsManagerOperation;
use serde_json::Value;
use std::collections::HashMap;

/// Required-field validation run before a request is built
pub trait Validate {
    /// # Errors
    ///
    /// [`Error::MissingRequiredField`] naming the first absent field.
    fn validate(&self) -> Result<()>;
}

/// An options value that maps onto one endpoint
pub trait Operation: Validate + Send + Sync {
    /// Typed result of a successful call
    type Output: Send;

    /// Operation name reported when the options value is missing
    const NAME: &'static str;

    fn endpoint(&self) -> SecretsManagerOperation;

    /// Values for the `{param}` placeholders of the path template
    fn path_params(&self) -> Vec<(&'static str, String)>;

    /// Query parameters; array values repeat the key
    fn query_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Caller headers, applied over the defaults
    fn headers(&self) -> Option<&HashMap<String, String>>;

    /// JSON body
    ///
    /// # Errors
    ///
    /// [`Error::InvalidModel`] when a model fails its collision check.
    fn body(&self) -> Result<Option<Value>> {
        Ok(None)
    }

    /// Decode the response body; `None` for endpoints that return no body
    ///
    /// # Errors
    ///
    /// The body does not match [`Self::Output`].
    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error>;
}

/// Borrow a required option, or report it missing
pub(crate) fn require<'a, T>(value: &'a Option<T>, name: &'static str) -> Result<&'a T> {
    value.as_ref().ok_or(Error::MissingRequiredField { name })
}

/// Decode a JSON body into `T`; an absent body decodes from `null`
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    body: Option<Value>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(body.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_field_name() {
        let absent: Option<String> = None;
        let err = require(&absent, "secret_type").unwrap_err();
        assert_eq!(err.to_string(), "missing required field: secret_type");
        assert_eq!(require(&Some(3), "limit").unwrap(), &3);
    }

    #[test]
    fn test_decode_json_rejects_absent_body_for_objects() {
        assert!(decode_json::<HashMap<String, Value>>(None).is_err());
    }
}
