//! Log store trait definition.
//!
//! This module defines the [`LogStore`] trait, the bulk key-value capability
//! the rotation-log verifier consumes. All store implementations
//! (MemoryLogStore, Redis, etc.) implement this trait.
//!
//! # Design Philosophy
//!
//! The trait is deliberately minimal:
//! - **Values are opaque strings**: each value holds one serialized signed log entry; the store
//!   never interprets it
//! - **Bulk-only reads**: the verifier always proves the full log in one pass, so the interface is
//!   "list everything, fetch everything" rather than point lookups
//! - **No ordering guarantee**: chain order is reconstructed from sequence numbers by the reader
//!
//! The append path is out of scope; this crate only serves readers.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Abstract read-side store for rotation log records.
///
/// Implementations are expected to be thread-safe (`Send + Sync`) and
/// support concurrent calls.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`list_keys`](LogStore::list_keys) | All record keys, unordered |
/// | [`bulk_get`](LogStore::bulk_get) | Values for the given keys |
/// | [`close`](LogStore::close) | Release the underlying connection |
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Returns every record key in the store.
    ///
    /// No ordering is guaranteed.
    async fn list_keys(&self) -> StorageResult<Vec<String>>;

    /// Retrieves the values for the given keys.
    ///
    /// The result has the same length and order as `keys`; keys that no
    /// longer exist yield `None` (callers skip them; a record deleted
    /// between `list_keys` and `bulk_get` is not an error).
    ///
    /// An empty `keys` slice returns an empty vector.
    async fn bulk_get(&self, keys: &[String]) -> StorageResult<Vec<Option<String>>>;

    /// Releases the underlying store connection.
    ///
    /// Intended to be called once at shutdown. After `close`, other
    /// operations may fail with [`StorageError::Connection`].
    ///
    /// The default implementation is a no-op for backends with nothing to
    /// release.
    ///
    /// [`StorageError::Connection`]: crate::StorageError::Connection
    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}
