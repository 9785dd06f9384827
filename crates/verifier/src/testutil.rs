//! Shared test utilities for fabricating signed rotation chains.
//!
//! Builds real chains: fresh P-256 keys, CESR-encoded public keys and
//! signatures, self-addressed payloads and rotation commitments, all of
//! which pass full validation. Tamper tests build individual entries via
//! [`build_entry`] with deliberately wrong fields.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! rotalog-verifier = { path = "../verifier", features = ["testutil"] }
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Duration, Utc};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::OsRng;

use crate::chain::ID_PLACEHOLDER;
use crate::digest::{Blake3Digest, DigestProvider};
use crate::raw::payload_text;
use crate::record::{LogEntry, PURPOSE_KEY_AUTHORIZATION, RawEntry, SignedLogEntry};

/// A P-256 keypair with its CESR-encoded public key.
#[derive(Debug, Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    /// CESR text form of the public key (`1AAI` + base64url compressed point).
    pub public_cesr: String,
}

impl Keypair {
    /// Returns the verifying half of this keypair.
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }
}

/// Generates a fresh random P-256 keypair.
#[must_use]
pub fn generate_keypair() -> Keypair {
    let signing_key = SigningKey::random(&mut OsRng);
    let public_cesr = encode_public_key(signing_key.verifying_key());
    Keypair { signing_key, public_cesr }
}

/// Encodes a P-256 public key in CESR text form.
#[must_use]
pub fn encode_public_key(key: &VerifyingKey) -> String {
    let compressed = key.to_encoded_point(true);
    format!("1AAI{}", URL_SAFE.encode(compressed.as_bytes()))
}

/// Encodes a fixed-width `r ‖ s` signature in CESR text form.
///
/// Two zero pad bytes are prepended before base64 encoding and the first
/// two characters are rewritten to the `0I` code.
#[must_use]
pub fn encode_signature(rs: &[u8]) -> String {
    let mut padded = Vec::with_capacity(rs.len() + 2);
    padded.extend_from_slice(&[0u8, 0u8]);
    padded.extend_from_slice(rs);
    let encoded = URL_SAFE.encode(&padded);
    format!("0I{}", &encoded[2..])
}

/// Signs `message` with the keypair, returning the CESR-encoded signature.
#[must_use]
pub fn sign_message(keypair: &Keypair, message: &str) -> String {
    let signature: Signature = keypair.signing_key.sign(message.as_bytes());
    encode_signature(signature.to_bytes().as_slice())
}

/// Inputs for building a single signed, self-addressed log entry.
///
/// Fields map one-to-one onto the payload; tamper tests set them to
/// deliberately inconsistent values and still get a correctly addressed,
/// correctly signed record.
pub struct EntryParams<'a> {
    /// Identity prefix. `None` means self-referential (genesis).
    pub prefix: Option<&'a str>,
    /// The predecessor's id, if any.
    pub previous: Option<&'a str>,
    /// Position in the chain.
    pub sequence_number: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Compromise-recovery marker.
    pub taint_previous: Option<bool>,
    /// Key purpose.
    pub purpose: &'a str,
    /// The keypair this generation signs with.
    pub keypair: &'a Keypair,
    /// Commitment to the next generation's public key.
    pub rotation_hash: &'a str,
}

/// Builds one signed store record, returning `(record_value, id)`.
///
/// The payload is serialized with the id mask in place of `id` (and
/// `prefix`, at genesis), digested to obtain the real id, and the mask is
/// substituted back before signing.
#[must_use]
pub fn build_entry(params: &EntryParams<'_>) -> (String, String) {
    let template = LogEntry {
        id: ID_PLACEHOLDER.to_string(),
        prefix: params.prefix.map_or_else(|| ID_PLACEHOLDER.to_string(), str::to_string),
        previous: params.previous.map(str::to_string),
        sequence_number: params.sequence_number,
        created_at: params.created_at,
        taint_previous: params.taint_previous,
        purpose: params.purpose.to_string(),
        public_key: params.keypair.public_cesr.clone(),
        rotation_hash: params.rotation_hash.to_string(),
    };

    let masked = serde_json::to_string(&template).expect("payload serialization");
    let id = Blake3Digest::new().sum(&masked);
    let payload_json = masked.replace(ID_PLACEHOLDER, &id);
    let signature = sign_message(params.keypair, &payload_json);

    let record = format!(r#"{{"payload":{payload_json},"signature":"{signature}"}}"#);
    (record, id)
}

/// One generation of a fabricated chain.
pub struct TestChainEntry {
    /// Content address of this generation.
    pub id: String,
    /// The full store record value.
    pub record: String,
    /// The keypair this generation signs with.
    pub keypair: Keypair,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A complete fabricated chain that passes full validation.
pub struct TestChain {
    entries: Vec<TestChainEntry>,
    raws: Vec<RawEntry>,
}

impl TestChain {
    /// Returns the identity prefix (the genesis id).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.entries[0].id
    }

    /// Returns the id of the generation at `index`.
    #[must_use]
    pub fn id(&self, index: usize) -> &str {
        &self.entries[index].id
    }

    /// Returns the keypair of the generation at `index`.
    #[must_use]
    pub fn keypair(&self, index: usize) -> &Keypair {
        &self.entries[index].keypair
    }

    /// Signs `message` with the generation at `index`.
    #[must_use]
    pub fn sign(&self, index: usize, message: &str) -> String {
        sign_message(&self.entries[index].keypair, message)
    }

    /// Returns the record values as a store `bulk_get` would.
    #[must_use]
    pub fn store_values(&self) -> Vec<Option<String>> {
        self.entries.iter().map(|entry| Some(entry.record.clone())).collect()
    }

    /// Returns the parsed entries in chain order.
    #[must_use]
    pub fn raw_entries(&self) -> &[RawEntry] {
        &self.raws
    }

    /// Returns the generations.
    #[must_use]
    pub fn entries(&self) -> &[TestChainEntry] {
        &self.entries
    }
}

/// Returns `count` strictly increasing timestamps, all in the recent past.
#[must_use]
pub fn chain_timestamps(count: usize) -> Vec<DateTime<Utc>> {
    let now = Utc::now();
    (0..count).map(|i| now - Duration::minutes((count - i) as i64)).collect()
}

/// Builds a valid chain with one generation per timestamp.
///
/// `taint_at` marks that generation with `taintPrevious: true`, simulating
/// a compromise recovery. Must not be zero: genesis carries no marker.
///
/// # Panics
///
/// Panics if `timestamps` is empty or `taint_at` is out of range.
#[must_use]
pub fn build_chain(timestamps: &[DateTime<Utc>], taint_at: Option<usize>) -> TestChain {
    assert!(!timestamps.is_empty(), "a chain needs at least a genesis entry");
    if let Some(index) = taint_at {
        assert!(index > 0 && index < timestamps.len(), "taint index out of range");
    }

    let digest = Blake3Digest::new();
    // One extra keypair: the last entry still commits to a successor.
    let keypairs: Vec<Keypair> = (0..=timestamps.len()).map(|_| generate_keypair()).collect();

    let mut entries: Vec<TestChainEntry> = Vec::with_capacity(timestamps.len());
    let mut prefix: Option<String> = None;

    for (i, &created_at) in timestamps.iter().enumerate() {
        let taint_previous = if i == 0 {
            None
        } else {
            Some(taint_at == Some(i))
        };
        let rotation_hash = digest.sum(&keypairs[i + 1].public_cesr);

        let (record, id) = build_entry(&EntryParams {
            prefix: prefix.as_deref(),
            previous: entries.last().map(|prev| prev.id.as_str()),
            sequence_number: i as u32,
            created_at,
            taint_previous,
            purpose: PURPOSE_KEY_AUTHORIZATION,
            keypair: &keypairs[i],
            rotation_hash: &rotation_hash,
        });

        if i == 0 {
            prefix = Some(id.clone());
        }
        entries.push(TestChainEntry { id, record, keypair: keypairs[i].clone(), created_at });
    }

    let raws = entries
        .iter()
        .map(|entry| {
            let payload_json =
                payload_text(&entry.record, "payload").expect("payload extraction");
            let record: SignedLogEntry =
                serde_json::from_str(&entry.record).expect("record parse");
            RawEntry { record, payload_json }
        })
        .collect();

    TestChain { entries, raws }
}
