//! # Rotalog Log Store
//!
//! Storage abstraction for the rotalog key-rotation log verifier.
//!
//! A rotation log is an unordered key→value map of opaque string records,
//! each holding one serialized signed log entry. This crate provides:
//!
//! - **[`LogStore`]**: the bulk-fetch capability the verifier consumes
//! - **[`MemoryLogStore`]**: an in-memory implementation for tests and development
//! - **[`StorageError`]**: the canonical error taxonomy for store backends
//!
//! Backends make no ordering guarantees; the verifier reconstructs chain
//! order itself from the entries' sequence numbers.
//!
//! ## Example
//!
//! ```
//! use rotalog_storage::{LogStore, MemoryLogStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryLogStore::new();
//!     store.insert("chain:0", r#"{"payload":{},"signature":""}"#);
//!
//!     let keys = store.list_keys().await?;
//!     let values = store.bulk_get(&keys).await?;
//!     assert_eq!(values.len(), 1);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Storage error types.
pub mod error;
/// In-memory log store.
pub mod memory;
/// Log store trait definition.
pub mod store;

pub use error::{BoxError, StorageError, StorageResult};
pub use memory::MemoryLogStore;
pub use store::LogStore;
