//! # Authentication
//!
//! Authenticators attach credentials to outgoing requests. Each one validates
//! its own configuration when the service is constructed; a failed check
//! surfaces as [`Error::InvalidAuth`].
//!
//! Token acquisition for IAM is delegated to a caller-supplied
//! [`TokenProvider`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const AUTH_TYPE_IAM: &str = "iam";
pub const AUTH_TYPE_BASIC: &str = "basic";
pub const AUTH_TYPE_BEARER_TOKEN: &str = "bearerToken";
pub const AUTH_TYPE_NO_AUTH: &str = "noAuth";

/// Default IAM token endpoint
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

#[async_trait]
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// One of the `AUTH_TYPE_*` names
    fn auth_type(&self) -> &'static str;

    /// Check the configuration without performing I/O
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAuth`] describing the problem.
    fn validate(&self) -> Result<()>;

    /// Add credentials to `headers`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAuth`] if credentials cannot be produced.
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()>;
}

fn authorization(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidAuth(format!("credentials are not a valid header value: {e}")))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Credential values copied from a UI often keep their surrounding braces or quotes
fn check_credential(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidAuth(format!("{name} must not be empty")));
    }
    let wrapped = |open: char, close: char| value.starts_with(open) || value.ends_with(close);
    if wrapped('{', '}') || wrapped('"', '"') {
        return Err(Error::InvalidAuth(format!(
            "{name} must not start or end with '{{', '}}' or '\"'"
        )));
    }
    Ok(())
}

/// Sends no credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthAuthenticator;

#[async_trait]
impl Authenticator for NoAuthAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_NO_AUTH
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn authenticate(&self, _headers: &mut HeaderMap) -> Result<()> {
        Ok(())
    }
}

/// `Authorization: Basic base64(username:password)`
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_BASIC
    }

    fn validate(&self) -> Result<()> {
        check_credential("username", &self.username)?;
        check_credential("password", &self.password)
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let mut raw = format!("{}:{}", self.username, self.password);
        let encoded = STANDARD.encode(raw.as_bytes());
        raw.zeroize();
        headers.insert(AUTHORIZATION, authorization(&format!("Basic {encoded}"))?);
        Ok(())
    }
}

/// `Authorization: Bearer <token>` with a caller-managed token
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_BEARER_TOKEN
    }

    fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::InvalidAuth("bearer token must not be empty".to_string()));
        }
        Ok(())
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(AUTHORIZATION, authorization(&format!("Bearer {}", self.token))?);
        Ok(())
    }
}

/// Exchanges an IAM API key for an access token
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// # Errors
    ///
    /// Any failure to obtain a token.
    async fn access_token(&self, apikey: &str, url: &str) -> Result<String>;
}

/// IAM API key authenticator
///
/// Tokens come from the configured [`TokenProvider`]; without one,
/// [`Authenticator::authenticate`] fails.
#[derive(Clone)]
pub struct IamAuthenticator {
    apikey: String,
    url: String,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl IamAuthenticator {
    pub fn new(apikey: impl Into<String>) -> Self {
        Self {
            apikey: apikey.into(),
            url: DEFAULT_IAM_URL.to_string(),
            token_provider: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for IamAuthenticator {
    fn drop(&mut self) {
        self.apikey.zeroize();
    }
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("apikey", &"[REDACTED]")
            .field("url", &self.url)
            .field("token_provider", &self.token_provider)
            .finish()
    }
}

#[async_trait]
impl Authenticator for IamAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_IAM
    }

    fn validate(&self) -> Result<()> {
        check_credential("apikey", &self.apikey)
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let provider = self.token_provider.as_ref().ok_or_else(|| {
            Error::InvalidAuth("IAM authenticator has no token provider".to_string())
        })?;
        let token = provider.access_token(&self.apikey, &self.url).await?;
        headers.insert(AUTHORIZATION, authorization(&format!("Bearer {token}"))?);
        Ok(())
    }
}
