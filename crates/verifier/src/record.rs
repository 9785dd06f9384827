//! Log entry data model.
//!
//! A rotation log is a set of [`SignedLogEntry`] records, one per key
//! generation. Entries are content-addressed: the `id` is the digest of the
//! entry's own payload text with the id itself masked out. Because that
//! digest (and the payload signature) are computed over the *exact* bytes
//! the writer produced, parsed entries travel together with the raw payload
//! substring as a [`RawEntry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only key purpose accepted by the verifier.
pub const PURPOSE_KEY_AUTHORIZATION: &str = "key-authorization";

/// One key generation in a rotation log.
///
/// Field order matters: the content address is computed over the serialized
/// payload, so writers and readers must agree on the JSON shape. Optional
/// fields are omitted entirely when absent, never emitted as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Content address of this entry (digest of the masked payload).
    pub id: String,
    /// Identity this chain belongs to. Equals `id` at genesis.
    pub prefix: String,
    /// Content address of the predecessor entry. Absent only at genesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Zero-based position within the chain.
    pub sequence_number: u32,
    /// When this generation was created.
    pub created_at: DateTime<Utc>,
    /// Compromise-recovery marker: when true, all older generations are
    /// untrusted. Absent at genesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taint_previous: Option<bool>,
    /// What this key is authorized for.
    pub purpose: String,
    /// CESR-encoded public key for this generation.
    pub public_key: String,
    /// Digest of the *next* generation's public key.
    pub rotation_hash: String,
}

/// A log entry together with the writer's signature over its payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedLogEntry {
    /// The entry payload.
    pub payload: LogEntry,
    /// CESR-encoded signature over the exact payload text.
    pub signature: String,
}

/// A parsed record paired with the exact payload substring it was parsed
/// from.
///
/// `payload_json` is the verbatim byte-for-byte slice of the store record;
/// content addressing and signature verification always operate on it,
/// never on a re-serialization of [`LogEntry`].
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// The parsed signed record.
    pub record: SignedLogEntry,
    /// The exact payload object text extracted from the store record.
    pub payload_json: String,
}

impl RawEntry {
    /// Returns the entry payload.
    #[must_use]
    pub fn payload(&self) -> &LogEntry {
        &self.record.payload
    }
}
