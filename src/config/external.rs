//! # External Configuration
//!
//! `{PREFIX}_*` keys, where `PREFIX` is the service name upper-cased with `-`
//! mapped to `_`:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `URL` | Service base URL |
//! | `AUTH_TYPE` | `iam`, `basic`, `bearerToken` or `noAuth` (case-insensitive) |
//! | `APIKEY`, `AUTH_URL` | IAM credentials |
//! | `USERNAME`, `PASSWORD` | Basic credentials |
//! | `BEARER_TOKEN` | Bearer token |
//! | `ENABLE_RETRIES`, `MAX_RETRIES`, `RETRY_INTERVAL` | Retry policy (interval in seconds) |
//! | `HTTP_TIMEOUT_SECS` | HTTP client timeout |
//!
//! Environment values win over the credentials file key by key. The file is
//! the path in `IBM_CREDENTIALS_FILE`, else `ibm-credentials.env` in the
//! working directory; a missing file contributes nothing.

use crate::auth::{
    Authenticator, BasicAuthenticator, BearerTokenAuthenticator, IamAuthenticator,
    NoAuthAuthenticator, TokenProvider, AUTH_TYPE_BASIC, AUTH_TYPE_BEARER_TOKEN, AUTH_TYPE_IAM,
    AUTH_TYPE_NO_AUTH,
};
use crate::constants::{CREDENTIALS_FILE_ENV, DEFAULT_CREDENTIALS_FILE, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExternalConfig {
    pub url: Option<String>,
    pub auth_type: Option<String>,
    pub apikey: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bearer_token: Option<String>,
    pub auth_url: Option<String>,
    pub enable_retries: bool,
    pub max_retries: Option<u32>,
    /// Seconds
    pub retry_interval: Option<u64>,
    /// Seconds; `None` when unset or unusable
    pub http_timeout_secs: Option<u64>,
}

impl fmt::Debug for ExternalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ExternalConfig")
            .field("url", &self.url)
            .field("auth_type", &self.auth_type)
            .field("apikey", &redact(&self.apikey))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("bearer_token", &redact(&self.bearer_token))
            .field("auth_url", &self.auth_url)
            .field("enable_retries", &self.enable_retries)
            .field("max_retries", &self.max_retries)
            .field("retry_interval", &self.retry_interval)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Key prefix for `service_name`, e.g. `secrets-manager` → `SECRETS_MANAGER`
pub(crate) fn prefix(service_name: &str) -> String {
    service_name.to_ascii_uppercase().replace('-', "_")
}

/// Credentials file named by the environment, else the working-directory default
fn credentials_file_path() -> PathBuf {
    std::env::var(CREDENTIALS_FILE_ENV)
        .ok()
        .filter(|path| !path.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE), PathBuf::from)
}

/// Numeric setting; garbage counts as unset
fn parse_number<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|value| value.trim().parse().ok())
}

impl ExternalConfig {
    /// Load from the process environment and the credentials file
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the credentials file exists but cannot be parsed.
    pub fn load(service_name: &str) -> Result<Self> {
        let file = Self::read_credentials_file(&credentials_file_path())?;
        Ok(Self::from_lookup(service_name, |key| {
            std::env::var(key).ok().or_else(|| file.get(key).cloned())
        }))
    }

    /// Key/value pairs of a dotenv-style credentials file; empty if the file is absent
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an unreadable or malformed file.
    pub fn read_credentials_file(path: &Path) -> Result<HashMap<String, String>> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!(path = %path.display(), "credentials file not found");
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        iter.map(|item| {
            item.map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
        })
        .collect()
    }

    /// Build from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup(service_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let prefix = prefix(service_name);
        let get = |key: &str| lookup(&format!("{prefix}_{key}")).filter(|value| !value.is_empty());

        Self {
            url: get("URL"),
            auth_type: get("AUTH_TYPE"),
            apikey: get("APIKEY"),
            username: get("USERNAME"),
            password: get("PASSWORD"),
            bearer_token: get("BEARER_TOKEN"),
            auth_url: get("AUTH_URL"),
            enable_retries: get("ENABLE_RETRIES")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true")),
            max_retries: parse_number(get("MAX_RETRIES")),
            retry_interval: parse_number(get("RETRY_INTERVAL")),
            http_timeout_secs: parse_number::<u64>(get("HTTP_TIMEOUT_SECS")).filter(|secs| *secs > 0),
        }
    }

    /// Authenticator described by `AUTH_TYPE` and its credential keys
    ///
    /// Without `AUTH_TYPE`, a configured API key selects IAM.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAuth`] for an unknown or absent auth type, or
    /// credentials that fail the authenticator's own checks.
    pub fn authenticator(
        &self,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> Result<Arc<dyn Authenticator>> {
        let auth_type = match (&self.auth_type, &self.apikey) {
            (Some(auth_type), _) => auth_type.trim().to_string(),
            (None, Some(_)) => AUTH_TYPE_IAM.to_string(),
            (None, None) => {
                return Err(Error::InvalidAuth(
                    "no authentication type configured".to_string(),
                ))
            }
        };
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let authenticator: Arc<dyn Authenticator> = if auth_type.eq_ignore_ascii_case(AUTH_TYPE_IAM)
        {
            let mut iam = IamAuthenticator::new(text(&self.apikey));
            if let Some(url) = &self.auth_url {
                iam = iam.with_url(url.clone());
            }
            if let Some(provider) = token_provider {
                iam = iam.with_token_provider(provider);
            }
            Arc::new(iam)
        } else if auth_type.eq_ignore_ascii_case(AUTH_TYPE_BASIC) {
            Arc::new(BasicAuthenticator::new(
                text(&self.username),
                text(&self.password),
            ))
        } else if auth_type.eq_ignore_ascii_case(AUTH_TYPE_BEARER_TOKEN) {
            Arc::new(BearerTokenAuthenticator::new(text(&self.bearer_token)))
        } else if auth_type.eq_ignore_ascii_case(AUTH_TYPE_NO_AUTH) {
            Arc::new(NoAuthAuthenticator)
        } else {
            return Err(Error::InvalidAuth(format!(
                "unknown authentication type '{auth_type}'"
            )));
        };

        authenticator.validate()?;
        Ok(authenticator)
    }

    /// Retry policy when `ENABLE_RETRIES` is set
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.enable_retries.then(|| {
            RetryPolicy::new(
                self.max_retries.unwrap_or(0),
                Duration::from_secs(self.retry_interval.unwrap_or(0)),
            )
        })
    }

    /// HTTP client timeout; unset, zero or unparsable values use the default
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_prefix_normalizes_service_name() {
        assert_eq!(prefix("secrets_manager"), "SECRETS_MANAGER");
        assert_eq!(prefix("my-secrets"), "MY_SECRETS");
    }

    #[test]
    fn test_reads_prefixed_keys() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_URL", "https://sm.example.com"),
                ("SECRETS_MANAGER_AUTH_TYPE", "basic"),
                ("SECRETS_MANAGER_USERNAME", "user"),
                ("SECRETS_MANAGER_PASSWORD", "pass"),
                ("OTHER_URL", "https://ignored.example.com"),
            ]),
        );
        assert_eq!(config.url.as_deref(), Some("https://sm.example.com"));
        let auth = config.authenticator(None).unwrap();
        assert_eq!(auth.auth_type(), AUTH_TYPE_BASIC);
    }

    #[test]
    fn test_auth_type_is_case_insensitive() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_AUTH_TYPE", "BEARERTOKEN"),
                ("SECRETS_MANAGER_BEARER_TOKEN", "tok"),
            ]),
        );
        assert_eq!(
            config.authenticator(None).unwrap().auth_type(),
            AUTH_TYPE_BEARER_TOKEN
        );
    }

    #[test]
    fn test_apikey_without_auth_type_selects_iam() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_APIKEY", "key"),
                ("SECRETS_MANAGER_AUTH_URL", "https://iam.test"),
            ]),
        );
        assert_eq!(config.authenticator(None).unwrap().auth_type(), AUTH_TYPE_IAM);
    }

    #[test]
    fn test_unknown_or_missing_auth_type_is_invalid() {
        let unknown = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[("SECRETS_MANAGER_AUTH_TYPE", "kerberos")]),
        );
        assert!(matches!(unknown.authenticator(None), Err(Error::InvalidAuth(_))));

        let missing = ExternalConfig::from_lookup("secrets_manager", lookup(&[]));
        assert!(matches!(missing.authenticator(None), Err(Error::InvalidAuth(_))));
    }

    #[test]
    fn test_basic_auth_without_password_is_invalid() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_AUTH_TYPE", "basic"),
                ("SECRETS_MANAGER_USERNAME", "user"),
            ]),
        );
        assert!(matches!(config.authenticator(None), Err(Error::InvalidAuth(_))));
    }

    #[test]
    fn test_retry_policy_and_timeout() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_ENABLE_RETRIES", "true"),
                ("SECRETS_MANAGER_MAX_RETRIES", "2"),
                ("SECRETS_MANAGER_HTTP_TIMEOUT_SECS", "0"),
            ]),
        );
        assert_eq!(
            config.retry_policy(),
            Some(RetryPolicy::new(2, Duration::ZERO))
        );
        assert_eq!(config.http_timeout(), Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        let disabled = ExternalConfig::from_lookup("secrets_manager", lookup(&[]));
        assert!(disabled.retry_policy().is_none());
    }

    #[test]
    fn test_numeric_keys_parse_to_their_own_widths() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_MAX_RETRIES", " 4 "),
                ("SECRETS_MANAGER_RETRY_INTERVAL", "5000000000"),
                ("SECRETS_MANAGER_HTTP_TIMEOUT_SECS", "90"),
            ]),
        );
        assert_eq!(config.max_retries, Some(4));
        assert_eq!(config.retry_interval, Some(5_000_000_000));
        assert_eq!(config.http_timeout(), Duration::from_secs(90));

        let garbage = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[
                ("SECRETS_MANAGER_MAX_RETRIES", "-1"),
                ("SECRETS_MANAGER_RETRY_INTERVAL", "soon"),
            ]),
        );
        assert_eq!(garbage.max_retries, None);
        assert_eq!(garbage.retry_interval, None);
    }

    #[test]
    fn test_credentials_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SECRETS_MANAGER_URL=https://file.example.com").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "SECRETS_MANAGER_AUTH_TYPE=noauth").unwrap();
        let values = ExternalConfig::read_credentials_file(file.path()).unwrap();
        let config = ExternalConfig::from_lookup("secrets_manager", |key| values.get(key).cloned());
        assert_eq!(config.url.as_deref(), Some("https://file.example.com"));
        assert_eq!(
            config.authenticator(None).unwrap().auth_type(),
            AUTH_TYPE_NO_AUTH
        );
    }

    #[test]
    fn test_missing_credentials_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let values = ExternalConfig::read_credentials_file(&dir.path().join("absent.env")).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = ExternalConfig::from_lookup(
            "secrets_manager",
            lookup(&[("SECRETS_MANAGER_APIKEY", "very-secret-key")]),
        );
        assert!(!format!("{config:?}").contains("very-secret-key"));
    }
}
