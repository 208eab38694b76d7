//! # Retry Policy
//!
//! Opt-in retries with exponential backoff:
//!
//! - Delay starts at 1 s and doubles per attempt, jittered by a factor in
//!   `[0.5, 1.5)` and capped at `max_interval`
//! - 429 and 5xx (except 501) are retried on idempotent verbs only
//! - Connection failures are retried on every verb; the request never left
//! - `Retry-After` (seconds) replaces the computed delay, still capped

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_MAX_INTERVAL_SECS, RETRY_INITIAL_INTERVAL_MS};
use paths::HttpMethod;
use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_interval: Duration::from_secs(DEFAULT_RETRY_MAX_INTERVAL_SECS),
        }
    }
}

impl RetryPolicy {
    /// Zero values fall back to the defaults
    pub fn new(max_retries: u32, max_interval: Duration) -> Self {
        let defaults = Self::default();
        Self {
            max_retries: if max_retries == 0 {
                defaults.max_retries
            } else {
                max_retries
            },
            max_interval: if max_interval.is_zero() {
                defaults.max_interval
            } else {
                max_interval
            },
        }
    }

    /// Jittered delay before retry number `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = Duration::from_millis(RETRY_INITIAL_INTERVAL_MS)
            .saturating_mul(2u32.saturating_pow(attempt.min(16)));
        let jitter = rand::thread_rng().gen_range(0.5..1.5);
        base.mul_f64(jitter).min(self.max_interval)
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
            || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
    }

    /// Delay before retrying a response, or `None` to return it as is
    pub(crate) fn delay_for_response(
        &self,
        attempt: u32,
        method: HttpMethod,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> Option<Duration> {
        if attempt >= self.max_retries || !method.is_idempotent() || !Self::is_retryable_status(status) {
            return None;
        }
        Some(
            retry_after(headers)
                .map_or_else(|| self.backoff(attempt), |delay| delay.min(self.max_interval)),
        )
    }

    /// Delay before retrying a transport failure, or `None` to report it
    pub(crate) fn delay_for_transport(&self, attempt: u32, err: &reqwest::Error) -> Option<Duration> {
        (attempt < self.max_retries && err.is_connect()).then(|| self.backoff(attempt))
    }
}

/// `Retry-After` in delta-seconds form
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
