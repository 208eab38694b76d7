//! # Constants
//!
//! Default values and wire constants shared across the SDK.

/// Service name used to derive the `{PREFIX}_*` configuration keys
pub const DEFAULT_SERVICE_NAME: &str = "secrets_manager";

/// Public endpoint used when neither options, environment nor credentials file set a URL
pub const DEFAULT_SERVICE_URL: &str = "https://secrets-manager.cloud.ibm.com";

/// Environment variable naming an alternative credentials file
pub const CREDENTIALS_FILE_ENV: &str = "IBM_CREDENTIALS_FILE";

/// Credentials file looked up in the working directory
pub const DEFAULT_CREDENTIALS_FILE: &str = "ibm-credentials.env";

/// HTTP client timeout (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Retry defaults applied when retries are switched on without explicit values
pub const DEFAULT_MAX_RETRIES: u32 = 4;
pub const DEFAULT_RETRY_MAX_INTERVAL_SECS: u64 = 30;

/// First backoff step; later steps double up to the configured maximum interval
pub const RETRY_INITIAL_INTERVAL_MS: u64 = 1_000;

pub const USER_AGENT: &str = concat!("secrets-manager-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Telemetry header attached to every request
pub const SDK_ANALYTICS_HEADER: &str = "x-sdk-analytics";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Media types used as `collection_type` and policy discriminators
pub mod media_types {
    pub const SECRET: &str = "application/vnd.ibm.secrets-manager.secret+json";
    pub const SECRET_GROUP: &str = "application/vnd.ibm.secrets-manager.secret.group+json";
    pub const SECRET_POLICY: &str = "application/vnd.ibm.secrets-manager.secret.policy+json";
    pub const SECRET_ACTION: &str = "application/vnd.ibm.secrets-manager.secret.action+json";
    pub const CONFIG: &str = "application/vnd.ibm.secrets-manager.config+json";
    pub const ERROR: &str = "application/vnd.ibm.cloud.error+json";
}

/// Known `secret_type` discriminator values
pub mod secret_types {
    pub const ARBITRARY: &str = "arbitrary";
    pub const USERNAME_PASSWORD: &str = "username_password";
    pub const IAM_CREDENTIALS: &str = "iam_credentials";
}

/// Known `action` query parameter values
pub mod actions {
    pub const ROTATE: &str = "rotate";
    pub const DELETE_CREDENTIALS: &str = "delete_credentials";
}

/// Known `policy` query parameter values
pub mod policies {
    pub const ROTATION: &str = "rotation";
}
