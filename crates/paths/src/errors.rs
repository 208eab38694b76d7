//! # Path Builder Errors

use thiserror::Error;

/// Errors raised while rendering a path template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathBuilderError {
    /// The template names a parameter that was never supplied
    #[error("missing path parameter '{0}'")]
    MissingParameter(String),
    /// A required path segment was supplied as an empty string
    #[error("path parameter '{0}' must not be empty")]
    EmptyParameter(String),
    /// A parameter was supplied that the template does not use
    #[error("unknown path parameter '{0}' for template {1}")]
    UnknownParameter(String, &'static str),
}
