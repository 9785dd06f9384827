//! Verification error types.
//!
//! Every failure mode of chain validation and key lookup maps to a distinct
//! variant so callers (and tests) can tell exactly which trust property was
//! violated. None of these errors are retriable: a chain that fails
//! validation is invalid until the underlying log changes. Transport
//! failures that survived the backend's bounded retry surface as
//! [`VerifyError::Storage`].

use rotalog_storage::StorageError;
use thiserror::Error;

/// Result type alias for verification operations.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors produced while validating the rotation log or verifying a message.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`; new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// A store record could not be parsed into a signed log entry.
    #[error("Malformed log record: {message}")]
    MalformedRecord {
        /// Description of what failed to parse.
        message: String,
    },

    /// An entry's `id` does not match the digest of its own payload.
    #[error("Content address mismatch for entry {id}")]
    BadContentAddress {
        /// The claimed entry id.
        id: String,
    },

    /// A cryptographic signature failed to decode or verify.
    #[error("Signature verification failed: {message}")]
    BadSignature {
        /// Description of the signature failure.
        message: String,
    },

    /// Sequence numbers within a chain are not contiguous from zero.
    #[error("Bad sequence number {sequence} at position {position}")]
    BadSequence {
        /// The sequence number carried by the entry.
        sequence: u32,
        /// The position of the entry within its sorted chain.
        position: usize,
    },

    /// An entry claims a creation time that has not happened yet.
    #[error("Entry {id} has a future timestamp")]
    FutureTimestamp {
        /// The entry id.
        id: String,
    },

    /// An entry's `previous` link does not point at its predecessor.
    #[error("Broken chain at entry {id}")]
    BrokenChain {
        /// The entry whose back-link is wrong or missing.
        id: String,
    },

    /// Timestamps within a chain do not strictly increase.
    #[error("Non-increasing timestamp at entry {id}")]
    NonIncreasingTimestamp {
        /// The offending entry id.
        id: String,
    },

    /// An entry's public key does not match the predecessor's rotation
    /// commitment.
    #[error("Rotation commitment mismatch at entry {id}")]
    BadCommitment {
        /// The entry whose key failed the commitment check.
        id: String,
    },

    /// No chain exists for the configured identity.
    #[error("Identity not found: {prefix}")]
    IdentityNotFound {
        /// The identity prefix that has no chain.
        prefix: String,
    },

    /// No trusted key exists for the requested generation id.
    #[error("Key not found for generation: {generation_id}")]
    KeyNotFound {
        /// The generation id that was looked up.
        generation_id: String,
    },

    /// The cached entry belongs to a different identity than requested.
    #[error("Identity mismatch: expected {expected}, found {found}")]
    IdentityMismatch {
        /// The identity the caller asked for.
        expected: String,
        /// The prefix carried by the cached entry.
        found: String,
    },

    /// The cached entry's purpose is not key authorization.
    #[error("Wrong key purpose: {purpose}")]
    WrongPurpose {
        /// The purpose carried by the cached entry.
        purpose: String,
    },

    /// The requested generation's verification window has closed.
    #[error("Key expired for generation: {generation_id}")]
    KeyExpired {
        /// The generation id whose window has closed.
        generation_id: String,
    },

    /// The log store failed after exhausting its bounded retries.
    #[error("Log store error: {0}")]
    Storage(#[from] StorageError),
}

impl VerifyError {
    /// Creates a new `MalformedRecord` error with the given message.
    #[must_use]
    pub fn malformed_record(message: impl Into<String>) -> Self {
        Self::MalformedRecord { message: message.into() }
    }

    /// Creates a new `BadContentAddress` error for the given entry id.
    #[must_use]
    pub fn bad_content_address(id: impl Into<String>) -> Self {
        Self::BadContentAddress { id: id.into() }
    }

    /// Creates a new `BadSignature` error with the given message.
    #[must_use]
    pub fn bad_signature(message: impl Into<String>) -> Self {
        Self::BadSignature { message: message.into() }
    }

    /// Creates a new `BadSequence` error.
    #[must_use]
    pub fn bad_sequence(sequence: u32, position: usize) -> Self {
        Self::BadSequence { sequence, position }
    }

    /// Creates a new `FutureTimestamp` error for the given entry id.
    #[must_use]
    pub fn future_timestamp(id: impl Into<String>) -> Self {
        Self::FutureTimestamp { id: id.into() }
    }

    /// Creates a new `BrokenChain` error for the given entry id.
    #[must_use]
    pub fn broken_chain(id: impl Into<String>) -> Self {
        Self::BrokenChain { id: id.into() }
    }

    /// Creates a new `NonIncreasingTimestamp` error for the given entry id.
    #[must_use]
    pub fn non_increasing_timestamp(id: impl Into<String>) -> Self {
        Self::NonIncreasingTimestamp { id: id.into() }
    }

    /// Creates a new `BadCommitment` error for the given entry id.
    #[must_use]
    pub fn bad_commitment(id: impl Into<String>) -> Self {
        Self::BadCommitment { id: id.into() }
    }

    /// Creates a new `IdentityNotFound` error for the given prefix.
    #[must_use]
    pub fn identity_not_found(prefix: impl Into<String>) -> Self {
        Self::IdentityNotFound { prefix: prefix.into() }
    }

    /// Creates a new `KeyNotFound` error for the given generation id.
    #[must_use]
    pub fn key_not_found(generation_id: impl Into<String>) -> Self {
        Self::KeyNotFound { generation_id: generation_id.into() }
    }

    /// Creates a new `IdentityMismatch` error.
    #[must_use]
    pub fn identity_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::IdentityMismatch { expected: expected.into(), found: found.into() }
    }

    /// Creates a new `WrongPurpose` error for the given purpose string.
    #[must_use]
    pub fn wrong_purpose(purpose: impl Into<String>) -> Self {
        Self::WrongPurpose { purpose: purpose.into() }
    }

    /// Creates a new `KeyExpired` error for the given generation id.
    #[must_use]
    pub fn key_expired(generation_id: impl Into<String>) -> Self {
        Self::KeyExpired { generation_id: generation_id.into() }
    }
}

/// Asserts that a result is an error matching the given [`VerifyError`]
/// variant pattern.
///
/// # Examples
///
/// ```ignore
/// assert_verify_error!(result, VerifyError::BrokenChain { .. });
/// ```
#[macro_export]
macro_rules! assert_verify_error {
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {},
            Ok(_) => panic!("expected {}, got Ok", stringify!($pattern)),
            Err(other) => panic!("expected {}, got {:?}", stringify!($pattern), other),
        }
    };
}
