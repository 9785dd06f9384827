//! Redis-backed log store.
//!
//! [`RedisLogStore`] reads the rotation log from a dedicated Redis logical
//! database: every key in that database holds one serialized signed log
//! entry. The two read operations (`KEYS *`, `MGET`) are retried with
//! backoff on transient network failures before surfacing to the verifier.
//!
//! The store takes no locks around Redis calls: [`ConnectionManager`] is a
//! cheaply-cloneable multiplexed connection that reconnects on failure,
//! which is exactly the behavior the retry wrapper relies on.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, ErrorKind, RedisError};
use rotalog_storage::{LogStore, StorageError, StorageResult};
use tokio::sync::Mutex;

use crate::config::{RedisStoreConfig, RetryConfig};
use crate::retry::with_retry;

/// Redis-backed implementation of [`LogStore`].
///
/// # Shutdown
///
/// [`close`](LogStore::close) drops the connection manager; subsequent
/// operations fail with [`StorageError::Connection`].
pub struct RedisLogStore {
    /// `None` after `close()`.
    connection: Mutex<Option<ConnectionManager>>,
    retry: RetryConfig,
}

impl RedisLogStore {
    /// Connects to Redis using the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the URL cannot be parsed or
    /// the initial connection fails.
    pub async fn connect(config: RedisStoreConfig) -> StorageResult<Self> {
        let client = redis::Client::open(config.url())
            .map_err(|err| map_redis_error("invalid redis url", err))?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(config.connect_timeout())
            .set_response_timeout(config.response_timeout());

        let connection = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(|err| map_redis_error("failed to connect to redis", err))?;

        tracing::debug!(url = config.url(), "connected to redis log store");

        Ok(Self::from_manager(connection, config.retry().clone()))
    }

    /// Wraps an existing connection manager.
    ///
    /// Useful when the connection is shared with other components.
    #[must_use]
    pub fn from_manager(connection: ConnectionManager, retry: RetryConfig) -> Self {
        Self { connection: Mutex::new(Some(connection)), retry }
    }

    /// Returns a clone of the multiplexed connection, or a `Connection`
    /// error if the store has been closed.
    async fn manager(&self) -> StorageResult<ConnectionManager> {
        self.connection
            .lock()
            .await
            .clone()
            .ok_or_else(|| StorageError::connection("log store connection closed"))
    }
}

#[async_trait]
impl LogStore for RedisLogStore {
    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        let connection = self.manager().await?;

        with_retry(&self.retry, "list_keys", || {
            let mut conn = connection.clone();
            async move {
                conn.keys::<_, Vec<String>>("*")
                    .await
                    .map_err(|err| map_redis_error("KEYS failed", err))
            }
        })
        .await
    }

    async fn bulk_get(&self, keys: &[String]) -> StorageResult<Vec<Option<String>>> {
        // Redis rejects a zero-argument MGET.
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let connection = self.manager().await?;

        with_retry(&self.retry, "bulk_get", || {
            let mut conn = connection.clone();
            async move {
                conn.mget::<_, Vec<Option<String>>>(keys)
                    .await
                    .map_err(|err| map_redis_error("MGET failed", err))
            }
        })
        .await
    }

    async fn close(&self) -> StorageResult<()> {
        let dropped = self.connection.lock().await.take();
        if dropped.is_some() {
            tracing::debug!("redis log store connection released");
        }
        Ok(())
    }
}

/// Maps a [`RedisError`] to the canonical [`StorageError`] taxonomy.
///
/// The mapping determines retry eligibility: I/O failures, timeouts and
/// cluster-transition errors are transient; type errors mean the data in
/// Redis has an unexpected shape and a retry cannot fix that.
fn map_redis_error(context: &str, err: RedisError) -> StorageError {
    if err.is_timeout() {
        tracing::warn!(context, "redis operation timed out");
        return StorageError::timeout();
    }

    match err.kind() {
        ErrorKind::IoError
        | ErrorKind::BusyLoadingError
        | ErrorKind::TryAgain
        | ErrorKind::ClusterDown
        | ErrorKind::MasterDown => {
            StorageError::connection_with_source(format!("{context}: {err}"), err)
        },
        ErrorKind::TypeError => {
            StorageError::serialization_with_source(format!("{context}: {err}"), err)
        },
        _ => StorageError::internal_with_source(format!("{context}: {err}"), err),
    }
}
