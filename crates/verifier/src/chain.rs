//! Chain assembly and validation.
//!
//! The store hands back an unordered pile of signed records. [`build_chains`]
//! groups them into per-identity chains ordered by sequence number, and
//! [`validate_chains`] proves each chain end to end: content addresses,
//! payload signatures, sequence contiguity, timestamp sanity, back-links and
//! rotation commitments. Validation is all-or-nothing: a single bad record
//! anywhere in the log aborts the rebuild so no partially-trusted state can
//! be cached.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::digest::DigestProvider;
use crate::error::{VerifyError, VerifyResult};
use crate::raw::payload_text;
use crate::record::{RawEntry, SignedLogEntry};
use crate::signature::SignatureVerifier;

/// The 44-character mask substituted for an entry's own id when computing
/// its content address. Same width as a digest, so masking does not change
/// the payload length.
pub const ID_PLACEHOLDER: &str = "############################################";

/// Chains grouped by identity prefix, each sorted by sequence number.
pub type Chains = HashMap<String, Vec<RawEntry>>;

/// Parses store values into per-identity chains.
///
/// Absent values (`None`) are skipped; the corresponding key was deleted
/// between `list_keys` and `bulk_get`. Each present value must carry a
/// parseable signed entry with an extractable payload object.
///
/// # Errors
///
/// Returns [`VerifyError::MalformedRecord`] if any value fails to parse.
pub fn build_chains(values: Vec<Option<String>>) -> VerifyResult<Chains> {
    let mut chains: Chains = HashMap::new();

    for value in values.into_iter().flatten() {
        let payload_json = payload_text(&value, "payload")?;
        let record: SignedLogEntry = serde_json::from_str(&value)
            .map_err(|e| VerifyError::malformed_record(format!("record parse: {e}")))?;

        chains
            .entry(record.payload.prefix.clone())
            .or_default()
            .push(RawEntry { record, payload_json });
    }

    for chain in chains.values_mut() {
        chain.sort_by_key(|raw| raw.payload().sequence_number);
    }

    Ok(chains)
}

/// Validates every chain in the log.
///
/// Runs two passes over each chain. The first proves each entry in
/// isolation: its content address and its payload signature. The second
/// proves the chain structure: contiguous sequence numbers, no future
/// timestamps, back-links to the predecessor's id, strictly increasing
/// timestamps, and each public key matching the predecessor's rotation
/// commitment.
///
/// # Errors
///
/// Returns the error for the first check that fails; see [`VerifyError`]
/// for the per-check variants.
pub fn validate_chains(
    chains: &Chains,
    digest: &dyn DigestProvider,
    signatures: &dyn SignatureVerifier,
    now: DateTime<Utc>,
) -> VerifyResult<()> {
    for chain in chains.values() {
        for raw in chain {
            check_content_address(raw, digest)?;
            signatures.verify(&raw.payload_json, &raw.record.signature, &raw.payload().public_key)?;
        }
    }

    for chain in chains.values() {
        let mut prior_id = String::new();
        let mut prior_rotation_hash = String::new();
        let mut prior_created_at = DateTime::<Utc>::MIN_UTC;

        for (position, raw) in chain.iter().enumerate() {
            let payload = raw.payload();

            if payload.sequence_number as usize != position {
                return Err(VerifyError::bad_sequence(payload.sequence_number, position));
            }

            if payload.created_at >= now {
                return Err(VerifyError::future_timestamp(&payload.id));
            }

            if payload.sequence_number != 0 {
                if payload.previous.as_deref() != Some(prior_id.as_str()) {
                    return Err(VerifyError::broken_chain(&payload.id));
                }

                if payload.created_at <= prior_created_at {
                    return Err(VerifyError::non_increasing_timestamp(&payload.id));
                }

                if digest.sum(&payload.public_key) != prior_rotation_hash {
                    return Err(VerifyError::bad_commitment(&payload.id));
                }
            }

            prior_id.clone_from(&payload.id);
            prior_rotation_hash.clone_from(&payload.rotation_hash);
            prior_created_at = payload.created_at;
        }
    }

    Ok(())
}

/// Checks that an entry's id is the digest of its own masked payload.
///
/// Genesis entries additionally self-certify the identity: `prefix` must
/// equal `id`.
fn check_content_address(raw: &RawEntry, digest: &dyn DigestProvider) -> VerifyResult<()> {
    let payload = raw.payload();

    if payload.sequence_number == 0 && payload.id != payload.prefix {
        return Err(VerifyError::bad_content_address(&payload.id));
    }

    let masked = raw.payload_json.replace(&payload.id, ID_PLACEHOLDER);
    if digest.sum(&masked) != payload.id {
        return Err(VerifyError::bad_content_address(&payload.id));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::assert_verify_error;
    use crate::digest::Blake3Digest;
    use crate::signature::P256Verifier;
    use crate::testutil::{build_chain, chain_timestamps};

    fn validate(values: Vec<Option<String>>) -> VerifyResult<Chains> {
        let chains = build_chains(values)?;
        validate_chains(&chains, &Blake3Digest::new(), &P256Verifier::new(), Utc::now())?;
        Ok(chains)
    }

    #[test]
    fn test_valid_chain_passes() {
        let chain = build_chain(&chain_timestamps(3), None);
        let chains = validate(chain.store_values()).unwrap();
        assert_eq!(chains[chain.prefix()].len(), 3);
    }

    #[test]
    fn test_single_genesis_entry_passes() {
        let chain = build_chain(&chain_timestamps(1), None);
        assert!(validate(chain.store_values()).is_ok());
    }

    #[test]
    fn test_unordered_store_values() {
        let chain = build_chain(&chain_timestamps(3), None);
        let mut values = chain.store_values();
        values.reverse();
        let chains = validate(values).unwrap();
        let sequences: Vec<u32> = chains[chain.prefix()]
            .iter()
            .map(|raw| raw.payload().sequence_number)
            .collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn test_absent_values_skipped() {
        let chain = build_chain(&chain_timestamps(2), None);
        let mut values = chain.store_values();
        values.push(None);
        assert!(validate(values).is_ok());
    }

    #[test]
    fn test_unparseable_record_rejected() {
        let result = validate(vec![Some("not json".to_string())]);
        assert_verify_error!(result, VerifyError::MalformedRecord { .. });
    }

    #[test]
    fn test_tampered_payload_byte_rejected() {
        let chain = build_chain(&chain_timestamps(2), None);
        let mut values = chain.store_values();
        // Flip one byte inside the second payload.
        let tampered = values[1].take().unwrap().replacen("sequenceNumber\":1", "sequenceNumber\":8", 1);
        values[1] = Some(tampered);
        let result = validate(values);
        assert_verify_error!(result, VerifyError::BadContentAddress { .. });
    }

    #[test]
    fn test_missing_entry_breaks_sequence() {
        let chain = build_chain(&chain_timestamps(3), None);
        let mut values = chain.store_values();
        values.remove(1);
        let result = validate(values);
        assert_verify_error!(result, VerifyError::BadSequence { .. });
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let timestamps = vec![Utc::now() + Duration::hours(1)];
        let chain = build_chain(&timestamps, None);
        let result = validate(chain.store_values());
        assert_verify_error!(result, VerifyError::FutureTimestamp { .. });
    }

    #[test]
    fn test_genesis_id_prefix_divergence_rejected() {
        let chain = build_chain(&chain_timestamps(1), None);
        let value = chain.store_values().remove(0).unwrap();
        // The id field serializes before the prefix field, so this rewrites
        // the id and leaves the prefix intact.
        let tampered = value.replacen(chain.prefix(), ID_PLACEHOLDER, 1);
        let result = validate(vec![Some(tampered)]);
        assert_verify_error!(result, VerifyError::BadContentAddress { .. });
    }

    #[test]
    fn test_two_identities_validate_independently() {
        let a = build_chain(&chain_timestamps(2), None);
        let b = build_chain(&chain_timestamps(3), None);
        let mut values = a.store_values();
        values.extend(b.store_values());
        let chains = validate(values).unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[a.prefix()].len(), 2);
        assert_eq!(chains[b.prefix()].len(), 3);
    }

    #[test]
    fn test_bad_chain_anywhere_fails_whole_log() {
        let good = build_chain(&chain_timestamps(2), None);
        let mut values = good.store_values();
        values.push(Some("{\"payload\":{},\"signature\":\"x\"}".to_string()));
        let result = validate(values);
        assert_verify_error!(result, VerifyError::MalformedRecord { .. });
    }
}
