//! Configuration for the Redis log store backend.
//!
//! This module provides [`RedisStoreConfig`], which configures the
//! connection to the Redis database holding the rotation log, and
//! [`RetryConfig`], which bounds the retry behavior for transient failures.

use std::time::Duration;

use rotalog_storage::StorageError;
use serde::{Deserialize, Serialize};

/// Default response timeout (30 seconds).
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (5 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`RedisLogStore`](crate::RedisLogStore).
///
/// # Example
///
/// ```
/// use rotalog_storage_redis::RedisStoreConfig;
///
/// let config = RedisStoreConfig::builder()
///     .url("redis://127.0.0.1:6379/2")
///     .build()?;
/// # Ok::<(), rotalog_storage::StorageError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisStoreConfig {
    /// Redis connection URL, including the logical database holding the log
    /// (e.g. `redis://host:6379/2`).
    pub(crate) url: String,

    /// Connection timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub(crate) connect_timeout: Duration,

    /// Per-request response timeout.
    #[serde(with = "humantime_serde", default = "default_response_timeout")]
    pub(crate) response_timeout: Duration,

    /// Retry behavior for transient failures.
    #[serde(default)]
    pub(crate) retry: RetryConfig,
}

fn default_response_timeout() -> Duration {
    DEFAULT_RESPONSE_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

#[bon::bon]
impl RedisStoreConfig {
    /// Creates a new configuration, validating all required fields.
    ///
    /// # Optional Fields
    ///
    /// * `connect_timeout` - Connection timeout (default: 5 seconds).
    /// * `response_timeout` - Per-request timeout (default: 30 seconds).
    /// * `retry` - Retry behavior (default: [`RetryConfig::default`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty.
    #[builder]
    pub fn new(
        #[builder(into)] url: String,
        #[builder(default = DEFAULT_CONNECT_TIMEOUT)] connect_timeout: Duration,
        #[builder(default = DEFAULT_RESPONSE_TIMEOUT)] response_timeout: Duration,
        #[builder(default)] retry: RetryConfig,
    ) -> Result<Self, StorageError> {
        if url.is_empty() {
            return Err(StorageError::internal("redis url cannot be empty"));
        }

        Ok(Self { url, connect_timeout, response_timeout, retry })
    }

    /// Returns the configured connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-request response timeout.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Returns the retry configuration.
    #[must_use]
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }
}

/// Retry behavior for transient store failures.
///
/// Retries use exponential backoff (`initial_backoff * 2^attempt`, capped
/// at `max_backoff`) with up to 50% added jitter. Only transient errors
/// are retried.
#[derive(Debug, Clone, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial call.
    #[serde(default = "default_max_retries")]
    #[builder(default = default_max_retries())]
    pub max_retries: u32,

    /// Initial backoff duration.
    #[serde(with = "humantime_serde", default = "default_initial_backoff")]
    #[builder(default = default_initial_backoff())]
    pub initial_backoff: Duration,

    /// Maximum backoff duration.
    #[serde(with = "humantime_serde", default = "default_max_backoff")]
    #[builder(default = default_max_backoff())]
    pub max_backoff: Duration,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(100)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(10)
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
        }
    }
}
