//! # Service Façade
//!
//! [`SecretsManager`] owns the service URL, the authenticator, one HTTP client
//! and the retry policy. Every named operation goes through [`SecretsManager::send`]:
//!
//! 1. Options present and valid
//! 2. Request built (no I/O)
//! 3. Credentials attached, request executed with retries under the context
//! 4. Response decoded into the operation's result type
//!
//! The façade is `Send + Sync` and meant to be shared; the `&mut self`
//! setters must be called before it is shared or while no call is in flight.

mod config;
mod secret_groups;
mod secrets;

use crate::auth::{Authenticator, TokenProvider};
use crate::config::{service_url_for_region, ExternalConfig};
use crate::constants::{DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_URL};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::request::{self, PreparedRequest};
use crate::response::{self, DetailedResponse, RawResponse};
use crate::retry::RetryPolicy;
use paths::HttpMethod;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info_span, warn, Instrument};

/// Default and `_with_context` methods for one operation
macro_rules! operation_methods {
    ($(#[$doc:meta])* $name:ident, $with_context:ident, $options:ty) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// See [`crate::Error`]; validation errors are raised before any I/O.
        pub async fn $name(
            &self,
            options: &$options,
        ) -> $crate::error::Result<
            $crate::response::DetailedResponse<<$options as $crate::operation::Operation>::Output>,
        > {
            self.send(&$crate::context::RequestContext::background(), Some(options))
                .await
        }

        #[doc = concat!("[`Self::", stringify!($name), "`] bounded by the deadline and cancellation of `ctx`")]
        ///
        /// # Errors
        ///
        /// As the default form, plus [`crate::Error::DeadlineExceeded`] and
        /// [`crate::Error::Canceled`].
        pub async fn $with_context(
            &self,
            ctx: &$crate::context::RequestContext,
            options: &$options,
        ) -> $crate::error::Result<
            $crate::response::DetailedResponse<<$options as $crate::operation::Operation>::Output>,
        > {
            self.send(ctx, Some(options)).await
        }
    };
}

pub(crate) use operation_methods;

/// Construction options; unset values come from external configuration
#[derive(Debug, Clone, Default)]
pub struct SecretsManagerOptions {
    /// Selects the `{PREFIX}_*` configuration keys; defaults to `secrets_manager`
    pub service_name: Option<String>,
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    /// Used by an IAM authenticator built from external configuration
    pub token_provider: Option<Arc<dyn TokenProvider>>,
}

/// Secrets Manager API client
#[derive(Debug)]
pub struct SecretsManager {
    service_url: String,
    authenticator: Arc<dyn Authenticator>,
    http: Arc<reqwest::Client>,
    timeout: Duration,
    retry: Option<RetryPolicy>,
}

/// Empty is accepted; requests then fail with [`Error::ServiceUrlMissing`]
fn check_service_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Ok(());
    }
    let invalid = |reason: String| Error::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Error::Transport)
}

impl SecretsManager {
    /// Build a client from `options`, filling gaps from the environment and
    /// the credentials file
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an unreadable credentials file
    /// - [`Error::InvalidUrl`] for a malformed service URL
    /// - [`Error::InvalidAuth`] when the authenticator fails its checks or
    ///   none can be built from configuration
    pub fn new(options: SecretsManagerOptions) -> Result<Self> {
        let service_name = options
            .service_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
        let config = ExternalConfig::load(&service_name)?;
        Self::with_external_config(options, &config)
    }

    /// Build a client from `options` over an already loaded configuration
    ///
    /// # Errors
    ///
    /// As [`Self::new`], minus configuration loading.
    pub fn with_external_config(
        options: SecretsManagerOptions,
        config: &ExternalConfig,
    ) -> Result<Self> {
        let service_url = options
            .url
            .or_else(|| config.url.clone())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        check_service_url(&service_url)?;

        let authenticator = match options.authenticator {
            Some(authenticator) => {
                authenticator.validate()?;
                authenticator
            }
            None => config.authenticator(options.token_provider)?,
        };

        let timeout = config.http_timeout();
        let http = Arc::new(http_client(timeout)?);
        let retry = config.retry_policy();

        debug!(
            service_url = %service_url,
            auth_type = authenticator.auth_type(),
            retries = retry.is_some(),
            "secrets_manager.service.created"
        );

        Ok(Self {
            service_url,
            authenticator,
            http,
            timeout,
            retry,
        })
    }

    /// Base URL of the service in `region`
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRegion`] for a region without a published endpoint.
    pub fn service_url_for_region(region: &str) -> Result<&'static str> {
        service_url_for_region(region)
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Replace the service URL; an empty URL is accepted and fails at call time
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`]; the current URL is kept.
    pub fn set_service_url(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        check_service_url(&url)?;
        self.service_url = url;
        Ok(())
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry
    }

    /// Retry failed requests; zero values select the defaults
    pub fn enable_retries(&mut self, max_retries: u32, max_interval: Duration) {
        self.retry = Some(RetryPolicy::new(max_retries, max_interval));
    }

    pub fn disable_retries(&mut self) {
        self.retry = None;
    }

    /// Whether both clients use the same connection pool
    pub fn shares_transport_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.http, &other.http)
    }

    /// HTTP client timeout applied to every request
    pub fn http_timeout(&self) -> Duration {
        self.timeout
    }

    /// Same URL, authenticator, timeout and retry policy over a fresh connection pool
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] when the HTTP client cannot be built.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(self.with_transport(Arc::new(http_client(self.timeout)?)))
    }

    fn with_transport(&self, http: Arc<reqwest::Client>) -> Self {
        Self {
            service_url: self.service_url.clone(),
            authenticator: Arc::clone(&self.authenticator),
            http,
            timeout: self.timeout,
            retry: self.retry,
        }
    }

    /// Validate, build, execute and decode one operation
    ///
    /// Named operations delegate here; `None` models a call without options.
    ///
    /// # Errors
    ///
    /// [`Error::MissingOptions`] for `None`, otherwise as the named operations.
    pub async fn send<O: Operation>(
        &self,
        ctx: &RequestContext,
        options: Option<&O>,
    ) -> Result<DetailedResponse<O::Output>> {
        let options = options.ok_or(Error::MissingOptions { operation: O::NAME })?;
        options.validate()?;
        let request = request::build(&self.service_url, options)?;
        let method = options.endpoint().method();

        let span = info_span!(
            "secrets_manager.request",
            operation = O::NAME,
            method = %request.method
        );
        async move {
            let raw = self.execute(ctx, method, request).await?;
            response::decode(options, raw)
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        mut request: PreparedRequest,
    ) -> Result<RawResponse> {
        ctx.run(self.authenticator.authenticate(&mut request.headers))
            .await??;

        let mut attempt = 0u32;
        loop {
            let mut builder = self
                .http
                .request(request.method.clone(), request.url.clone())
                .headers(request.headers.clone());
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }
            debug!(attempt, url = %request.url, "secrets_manager.request.dispatch");

            let delay = match ctx.run(builder.send()).await? {
                Ok(response) => {
                    let raw = ctx
                        .run(RawResponse::read(response))
                        .await?
                        .map_err(Error::Transport)?;
                    match self.retry.and_then(|policy| {
                        policy.delay_for_response(attempt, method, raw.status(), raw.headers())
                    }) {
                        Some(delay) => delay,
                        None => return Ok(raw),
                    }
                }
                Err(e) => match self
                    .retry
                    .and_then(|policy| policy.delay_for_transport(attempt, &e))
                {
                    Some(delay) => delay,
                    None => return Err(Error::Transport(e)),
                },
            };

            if ctx.remaining().is_some_and(|remaining| delay >= remaining) {
                return Err(Error::DeadlineExceeded);
            }
            attempt += 1;
            warn!(attempt, delay = ?delay, "secrets_manager.request.retry");
            ctx.run(tokio::time::sleep(delay)).await?;
        }
    }
}

impl Clone for SecretsManager {
    /// See [`SecretsManager::try_clone`]; when no new client can be built the
    /// clone shares this one's pool, keeping its timeout
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| {
            warn!(error = %e, "secrets_manager.clone.shared_transport");
            self.with_transport(Arc::clone(&self.http))
        })
    }
}
