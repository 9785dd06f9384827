//! # Rotalog Redis Log Store
//!
//! Redis-backed implementation of the
//! [`LogStore`](rotalog_storage::LogStore) trait.
//!
//! The rotation log lives in a dedicated Redis logical database where every
//! key holds one serialized signed log entry. Reads are bulk-only
//! (`KEYS *` + `MGET`) because the verifier always proves the full log in
//! one pass.
//!
//! Transient Redis failures (I/O errors, timeouts, dropped connections) are
//! retried with exponential backoff before surfacing to the caller; see
//! [`RetryConfig`].
//!
//! ## Example
//!
//! ```no_run
//! use rotalog_storage::LogStore;
//! use rotalog_storage_redis::{RedisLogStore, RedisStoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RedisStoreConfig::builder()
//!     .url("redis://127.0.0.1:6379/2")
//!     .build()?;
//!
//! let store = RedisLogStore::connect(config).await?;
//! let keys = store.list_keys().await?;
//! let records = store.bulk_get(&keys).await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Redis-backed log store.
pub mod backend;
/// Backend configuration.
pub mod config;
/// Retry logic for transient failures.
pub(crate) mod retry;

pub use backend::RedisLogStore;
pub use config::{RedisStoreConfig, RetryConfig};
