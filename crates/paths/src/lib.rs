//! Shared API path definitions for the Secrets Manager service
//!
//! This crate centralizes all API paths to ensure consistency
//! between the SDK and the mock server implementation.
//!
//! ## PathBuilder
//!
//! The `PathBuilder` provides a type-safe, builder-pattern API for constructing
//! API paths with different output formats (router patterns or escaped HTTP paths).
//!
//! ## Operations
//!
//! `SecretsManagerOperation` lists every endpoint together with its verb, path
//! template, success status and response body kind.

pub mod builder;
pub mod errors;
pub mod formats;
pub mod operations;

pub use builder::PathBuilder;
pub use errors::PathBuilderError;
pub use formats::PathFormat;
pub use operations::{HttpMethod, ResponseBody, SecretsManagerOperation};

/// Prefix shared by every versioned API path
pub const API_PREFIX: &str = "/api/v1";
