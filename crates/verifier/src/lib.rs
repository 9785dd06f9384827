//! Verifier for an append-only key-rotation log.
//!
//! A writer (typically an HSM) maintains a chain of signed, content-addressed
//! log entries, one per key generation. Each entry commits to the *next*
//! public key before that key is ever used, so a reader that trusts the
//! genesis entry can derive trust in every later generation without any
//! out-of-band channel. This crate implements the reader side: it pulls the
//! whole log from a [`LogStore`](rotalog_storage::LogStore), proves every
//! chain, computes the sliding trust window and answers signature
//! verification requests per generation.
//!
//! # Trust model
//!
//! - an entry's `id` is the digest of its own payload with the id masked out, so any mutation is
//!   detectable;
//! - every payload is signed by the key it declares;
//! - every entry names its predecessor and matches the predecessor's rotation commitment;
//! - a generation stays usable for one verification window after being superseded;
//! - a `taintPrevious` marker revokes every older generation after a compromise recovery.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use rotalog_storage::MemoryLogStore;
//! use rotalog_verifier::{KeyVerifier, VerifierConfig};
//!
//! # async fn example() -> Result<(), rotalog_verifier::VerifyError> {
//! let store = Arc::new(MemoryLogStore::new());
//! let config = VerifierConfig::builder()
//!     .identity("EGenesisId000000000000000000000000000000000x")
//!     .build();
//! let verifier = KeyVerifier::new(store, config);
//!
//! verifier.verify("<signature>", "<identity>", "<generation-id>", "<message>").await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Chain assembly and validation.
pub mod chain;
/// Verifier configuration.
pub mod config;
/// Content-address digests.
pub mod digest;
/// Verification error types.
pub mod error;
/// Raw payload extraction.
pub mod raw;
/// Log entry data model.
pub mod record;
/// Signature verification.
pub mod signature;
/// Shared test utilities for fabricating signed rotation chains.
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;
/// The key verifier facade.
pub mod verifier;
/// Sliding trust window.
pub mod window;

pub use chain::{Chains, ID_PLACEHOLDER, build_chains, validate_chains};
pub use config::{DEFAULT_ACCESS_GRANT_LIFETIME, DEFAULT_SERVER_KEY_LIFETIME, VerifierConfig};
pub use digest::{Blake3Digest, DIGEST_LEN, DigestProvider};
pub use error::{VerifyError, VerifyResult};
pub use record::{LogEntry, PURPOSE_KEY_AUTHORIZATION, RawEntry, SignedLogEntry};
pub use signature::{P256Verifier, SignatureVerifier};
pub use verifier::KeyVerifier;
pub use window::{CacheEntry, build_window};
