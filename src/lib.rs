//! # Secrets Manager SDK
//!
//! Client library for the Secrets Manager REST API.
//!
//! ## Overview
//!
//! - Typed options per endpoint, validated before any request is built
//! - Polymorphic secret, engine configuration, action and policy models
//!   dispatched through process-wide discriminator registries
//! - Additional properties preserved across decode and encode
//! - Deadline and cancellation through [`RequestContext`]
//! - Opt-in retries with capped exponential backoff
//! - Service URL and authenticator from explicit options, the environment or
//!   a credentials file
//!
//! ```no_run
//! use secrets_manager_sdk::auth::BearerTokenAuthenticator;
//! use secrets_manager_sdk::constants::{media_types, secret_types};
//! use secrets_manager_sdk::models::{ArbitrarySecretResource, CollectionMetadata, SecretResource};
//! use secrets_manager_sdk::options::CreateSecretOptions;
//! use secrets_manager_sdk::{SecretsManager, SecretsManagerOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> secrets_manager_sdk::Result<()> {
//! let service = SecretsManager::new(SecretsManagerOptions {
//!     url: Some("https://secrets-manager.example.com".to_string()),
//!     authenticator: Some(Arc::new(BearerTokenAuthenticator::new("token"))),
//!     ..Default::default()
//! })?;
//!
//! let secret = ArbitrarySecretResource::new("example-arbitrary-secret").with_payload("secret-data");
//! let options = CreateSecretOptions::new(
//!     secret_types::ARBITRARY,
//!     CollectionMetadata::new(media_types::SECRET, 1),
//!     vec![SecretResource::Arbitrary(secret)],
//! );
//! let created = service.create_secret(&options).await?;
//! println!("created {:?}", created.result.resources[0].id());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod codec;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod models;
pub mod operation;
pub mod options;
pub mod registry;
pub mod request;
pub mod response;
pub mod retry;
pub mod service;

pub use context::{CancelHandle, RequestContext};
pub use error::{Error, HttpError, Result};
pub use operation::{Operation, Validate};
pub use response::{DetailedResponse, RawResponse};
pub use retry::RetryPolicy;
pub use service::{SecretsManager, SecretsManagerOptions};
