//! # Path Builder
//!
//! Renders an operation's path template.
//!
//! ```
//! use paths::{PathBuilder, PathFormat, SecretsManagerOperation};
//!
//! let path = PathBuilder::new(SecretsManagerOperation::GetSecret)
//!     .param("secret_type", "arbitrary")
//!     .param("id", "a b")
//!     .build(PathFormat::Http)
//!     .unwrap();
//! assert_eq!(path, "/api/v1/secrets/arbitrary/a%20b");
//! ```

use crate::errors::PathBuilderError;
use crate::formats::PathFormat;
use crate::operations::SecretsManagerOperation;

/// Builder for a single operation path
#[derive(Debug, Clone)]
pub struct PathBuilder {
    operation: SecretsManagerOperation,
    params: Vec<(String, String)>,
}

impl PathBuilder {
    pub fn new(operation: SecretsManagerOperation) -> Self {
        Self {
            operation,
            params: Vec::new(),
        }
    }

    /// Supply a value for a `{name}` placeholder. Later values replace earlier ones.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.params.retain(|(existing, _)| *existing != name);
        self.params.push((name, value.into()));
        self
    }

    /// Render the template in the requested format
    ///
    /// # Errors
    ///
    /// For [`PathFormat::Http`], every placeholder needs a non-empty value and
    /// no unknown parameter may be supplied.
    pub fn build(&self, format: PathFormat) -> Result<String, PathBuilderError> {
        let template = self.operation.template();
        if format == PathFormat::Route {
            return Ok(template.to_string());
        }

        let expected = self.operation.path_parameters();
        if let Some((unknown, _)) = self
            .params
            .iter()
            .find(|(name, _)| !expected.contains(&name.as_str()))
        {
            return Err(PathBuilderError::UnknownParameter(unknown.clone(), template));
        }

        let mut rendered = String::with_capacity(template.len() + 32);
        for segment in template.split('/').skip(1) {
            rendered.push('/');
            match segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            {
                Some(name) => {
                    let value = self
                        .params
                        .iter()
                        .find(|(param, _)| param == name)
                        .map(|(_, value)| value)
                        .ok_or_else(|| PathBuilderError::MissingParameter(name.to_string()))?;
                    if value.is_empty() {
                        return Err(PathBuilderError::EmptyParameter(name.to_string()));
                    }
                    rendered.push_str(&urlencoding::encode(value));
                }
                None => rendered.push_str(segment),
            }
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_format_keeps_placeholders() {
        let route = PathBuilder::new(SecretsManagerOperation::PutPolicy)
            .build(PathFormat::Route)
            .unwrap();
        assert_eq!(route, "/api/v1/secrets/{secret_type}/{id}/policies");
    }

    #[test]
    fn test_http_format_substitutes_all_parameters() {
        let path = PathBuilder::new(SecretsManagerOperation::UpdateSecretMetadata)
            .param("secret_type", "username_password")
            .param("id", "7d5c1f0e")
            .build(PathFormat::Http)
            .unwrap();
        assert_eq!(path, "/api/v1/secrets/username_password/7d5c1f0e/metadata");
    }

    #[test]
    fn test_http_format_escapes_reserved_characters() {
        let path = PathBuilder::new(SecretsManagerOperation::GetSecretGroup)
            .param("id", "../x?y")
            .build(PathFormat::Http)
            .unwrap();
        assert_eq!(path, "/api/v1/secret_groups/..%2Fx%3Fy");
    }

    #[test]
    fn test_empty_parameter_is_rejected() {
        let err = PathBuilder::new(SecretsManagerOperation::GetSecret)
            .param("secret_type", "arbitrary")
            .param("id", "")
            .build(PathFormat::Http)
            .unwrap_err();
        assert_eq!(err, PathBuilderError::EmptyParameter("id".to_string()));
    }

    #[test]
    fn test_missing_parameter_is_rejected() {
        let err = PathBuilder::new(SecretsManagerOperation::GetConfig)
            .build(PathFormat::Http)
            .unwrap_err();
        assert_eq!(
            err,
            PathBuilderError::MissingParameter("secret_type".to_string())
        );
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let err = PathBuilder::new(SecretsManagerOperation::ListAllSecrets)
            .param("id", "x")
            .build(PathFormat::Http)
            .unwrap_err();
        assert!(matches!(err, PathBuilderError::UnknownParameter(name, _) if name == "id"));
    }
}
