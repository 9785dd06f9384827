//! In-memory log store implementation.
//!
//! This module provides [`MemoryLogStore`], an in-memory implementation of
//! [`LogStore`] suitable for testing and development.
//!
//! # Example
//!
//! ```
//! use rotalog_storage::{LogStore, MemoryLogStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryLogStore::new();
//!     store.insert("key-log:0", "{}");
//!
//!     let keys = store.list_keys().await.unwrap();
//!     assert_eq!(keys, vec!["key-log:0"]);
//! }
//! ```
//!
//! # Limitations
//!
//! Data is not persisted; all records are lost when the process exits.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StorageResult;
use crate::store::LogStore;

/// In-memory log store backed by a [`BTreeMap`].
///
/// Primarily intended for tests, where the record set is mutated between
/// verification passes to exercise cache-rebuild behavior.
///
/// # Cloning
///
/// `MemoryLogStore` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying record map.
#[derive(Clone, Default)]
pub struct MemoryLogStore {
    records: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryLogStore {
    /// Creates a new, empty in-memory log store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.records.write().insert(key.into(), value.into());
    }

    /// Removes a record, returning its value if it existed.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.records.write().remove(key)
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Returns the number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.records.read().keys().cloned().collect())
    }

    async fn bulk_get(&self, keys: &[String]) -> StorageResult<Vec<Option<String>>> {
        let records = self.records.read();
        Ok(keys.iter().map(|key| records.get(key).cloned()).collect())
    }
}
