//! # Service Configuration
//!
//! External configuration for the service façade, loaded per service name from
//! the process environment and a dotenv-style credentials file.
//!
//! Precedence, highest first: explicit [`crate::SecretsManagerOptions`] →
//! environment → credentials file → built-in defaults.

mod external;
pub mod regions;

pub use external::ExternalConfig;
pub use regions::service_url_for_region;
