//! End-to-end verification against an in-memory log store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rotalog_storage::MemoryLogStore;
use rotalog_verifier::testutil::{
    EntryParams, TestChain, build_chain, build_entry, chain_timestamps, generate_keypair,
    sign_message,
};
use rotalog_verifier::{
    Blake3Digest, DigestProvider, KeyVerifier, VerifierConfig, VerifyError, assert_verify_error,
};

fn store_with(chain: &TestChain) -> Arc<MemoryLogStore> {
    let store = MemoryLogStore::new();
    for (i, entry) in chain.entries().iter().enumerate() {
        store.insert(format!("entry-{i}"), entry.record.clone());
    }
    Arc::new(store)
}

fn verifier_for(chain: &TestChain) -> KeyVerifier {
    let config = VerifierConfig::builder().identity(chain.prefix()).build();
    KeyVerifier::new(store_with(chain), config)
}

#[tokio::test]
async fn test_valid_message_verifies_for_every_generation() {
    let chain = build_chain(&chain_timestamps(3), None);
    let verifier = verifier_for(&chain);

    for i in 0..3 {
        let signature = chain.sign(i, "attested message");
        verifier
            .verify(&signature, chain.prefix(), chain.id(i), "attested message")
            .await
            .unwrap_or_else(|e| panic!("generation {i} should verify: {e}"));
    }
}

#[tokio::test]
async fn test_wrong_message_signature_rejected() {
    let chain = build_chain(&chain_timestamps(2), None);
    let verifier = verifier_for(&chain);

    let signature = chain.sign(1, "message A");
    let result = verifier.verify(&signature, chain.prefix(), chain.id(1), "message B").await;
    assert_verify_error!(result, VerifyError::BadSignature { .. });
}

#[tokio::test]
async fn test_signature_from_older_generation_rejected() {
    let chain = build_chain(&chain_timestamps(2), None);
    let verifier = verifier_for(&chain);

    // Signed with generation 0's key but claimed as generation 1.
    let signature = chain.sign(0, "message");
    let result = verifier.verify(&signature, chain.prefix(), chain.id(1), "message").await;
    assert_verify_error!(result, VerifyError::BadSignature { .. });
}

#[tokio::test]
async fn test_unknown_generation_rejected() {
    let chain = build_chain(&chain_timestamps(2), None);
    let verifier = verifier_for(&chain);

    let signature = chain.sign(1, "message");
    let result = verifier.verify(&signature, chain.prefix(), "EUnknownGeneration", "message").await;
    assert_verify_error!(result, VerifyError::KeyNotFound { .. });
}

#[tokio::test]
async fn test_identity_mismatch_rejected() {
    let chain = build_chain(&chain_timestamps(2), None);
    let verifier = verifier_for(&chain);

    let signature = chain.sign(1, "message");
    let result = verifier.verify(&signature, "ESomeOtherIdentity", chain.id(1), "message").await;
    assert_verify_error!(result, VerifyError::IdentityMismatch { .. });
}

#[tokio::test]
async fn test_missing_entry_fails_whole_rebuild() {
    let chain = build_chain(&chain_timestamps(3), None);
    let store = MemoryLogStore::new();
    // Skip the middle generation.
    store.insert("entry-0".to_string(), chain.entries()[0].record.clone());
    store.insert("entry-2".to_string(), chain.entries()[2].record.clone());

    let config = VerifierConfig::builder().identity(chain.prefix()).build();
    let verifier = KeyVerifier::new(Arc::new(store), config);

    let signature = chain.sign(2, "message");
    let result = verifier.verify(&signature, chain.prefix(), chain.id(2), "message").await;
    assert_verify_error!(result, VerifyError::BadSequence { .. });
}

#[tokio::test]
async fn test_forged_back_link_rejected() {
    let chain = build_chain(&chain_timestamps(2), None);
    let digest = Blake3Digest::new();

    // A correctly signed, correctly addressed successor whose `previous`
    // points somewhere else entirely.
    let keypair = generate_keypair();
    let next = generate_keypair();
    let rotation_hash = digest.sum(&next.public_cesr);
    let (forged, _) = build_entry(&EntryParams {
        prefix: Some(chain.prefix()),
        previous: Some("ENotTheRealPredecessor0000000000000000000000"),
        sequence_number: 1,
        created_at: Utc::now() - Duration::seconds(30),
        taint_previous: Some(false),
        purpose: "key-authorization",
        keypair: &keypair,
        rotation_hash: &rotation_hash,
    });

    let store = MemoryLogStore::new();
    store.insert("entry-0".to_string(), chain.entries()[0].record.clone());
    store.insert("entry-1".to_string(), forged);

    let config = VerifierConfig::builder().identity(chain.prefix()).build();
    let verifier = KeyVerifier::new(Arc::new(store), config);

    let signature = sign_message(&keypair, "message");
    let result = verifier.verify(&signature, chain.prefix(), chain.id(0), "message").await;
    assert_verify_error!(result, VerifyError::BrokenChain { .. });
}

#[tokio::test]
async fn test_uncommitted_key_rejected() {
    let chain = build_chain(&chain_timestamps(1), None);
    let digest = Blake3Digest::new();

    // Valid back-link, but the key was never committed to by the genesis
    // entry's rotation hash.
    let keypair = generate_keypair();
    let next = generate_keypair();
    let rotation_hash = digest.sum(&next.public_cesr);
    let (entry, _) = build_entry(&EntryParams {
        prefix: Some(chain.prefix()),
        previous: Some(chain.id(0)),
        sequence_number: 1,
        created_at: Utc::now() - Duration::seconds(30),
        taint_previous: Some(false),
        purpose: "key-authorization",
        keypair: &keypair,
        rotation_hash: &rotation_hash,
    });

    let store = store_with(&chain);
    store.insert("entry-1".to_string(), entry);

    let config = VerifierConfig::builder().identity(chain.prefix()).build();
    let verifier = KeyVerifier::new(store, config);

    let signature = sign_message(&keypair, "message");
    let result = verifier.verify(&signature, chain.prefix(), chain.id(0), "message").await;
    assert_verify_error!(result, VerifyError::BadCommitment { .. });
}

#[tokio::test]
async fn test_backdated_successor_rejected() {
    let base = Utc::now() - Duration::hours(1);
    let digest = Blake3Digest::new();

    // Correctly committed key and valid back-link, but the successor claims
    // to have been created before its predecessor.
    let genesis_key = generate_keypair();
    let second_key = generate_keypair();
    let third_key = generate_keypair();

    let (genesis, genesis_id) = build_entry(&EntryParams {
        prefix: None,
        previous: None,
        sequence_number: 0,
        created_at: base,
        taint_previous: None,
        purpose: "key-authorization",
        keypair: &genesis_key,
        rotation_hash: &digest.sum(&second_key.public_cesr),
    });
    let (successor, _) = build_entry(&EntryParams {
        prefix: Some(&genesis_id),
        previous: Some(&genesis_id),
        sequence_number: 1,
        created_at: base - Duration::minutes(10),
        taint_previous: Some(false),
        purpose: "key-authorization",
        keypair: &second_key,
        rotation_hash: &digest.sum(&third_key.public_cesr),
    });

    let store = MemoryLogStore::new();
    store.insert("entry-0".to_string(), genesis);
    store.insert("entry-1".to_string(), successor);

    let config = VerifierConfig::builder().identity(&genesis_id).build();
    let verifier = KeyVerifier::new(Arc::new(store), config);

    let signature = sign_message(&genesis_key, "message");
    let result = verifier.verify(&signature, &genesis_id, &genesis_id, "message").await;
    assert_verify_error!(result, VerifyError::NonIncreasingTimestamp { .. });
}

#[tokio::test]
async fn test_wrong_purpose_rejected() {
    let keypair = generate_keypair();
    let next = generate_keypair();
    let digest = Blake3Digest::new();

    let (record, id) = build_entry(&EntryParams {
        prefix: None,
        previous: None,
        sequence_number: 0,
        created_at: Utc::now() - Duration::minutes(1),
        taint_previous: None,
        purpose: "tls-termination",
        keypair: &keypair,
        rotation_hash: &digest.sum(&next.public_cesr),
    });

    let store = MemoryLogStore::new();
    store.insert("entry-0".to_string(), record);

    let config = VerifierConfig::builder().identity(&id).build();
    let verifier = KeyVerifier::new(Arc::new(store), config);

    let signature = sign_message(&keypair, "message");
    let result = verifier.verify(&signature, &id, &id, "message").await;
    assert_verify_error!(result, VerifyError::WrongPurpose { .. });
}

#[tokio::test]
async fn test_tainted_generations_not_found() {
    let chain = build_chain(&chain_timestamps(3), Some(2));
    let verifier = verifier_for(&chain);

    // The recovery generation itself works.
    let signature = chain.sign(2, "message");
    verifier.verify(&signature, chain.prefix(), chain.id(2), "message").await.unwrap();

    // Everything older is gone, no matter how the request is signed.
    for i in 0..2 {
        let signature = chain.sign(i, "message");
        let result = verifier.verify(&signature, chain.prefix(), chain.id(i), "message").await;
        assert_verify_error!(result, VerifyError::KeyNotFound { .. });
    }
}

#[tokio::test]
async fn test_superseded_generation_expires() {
    let now = Utc::now();
    let chain = build_chain(&[now - Duration::minutes(10), now - Duration::seconds(1)], None);

    let config = VerifierConfig::builder()
        .identity(chain.prefix())
        .server_key_lifetime(StdDuration::from_secs(1))
        .access_grant_lifetime(StdDuration::from_secs(1))
        .build();
    let verifier = KeyVerifier::new(store_with(&chain), config);

    // Inside the window: the superseded generation still verifies.
    let signature = chain.sign(0, "message");
    verifier.verify(&signature, chain.prefix(), chain.id(0), "message").await.unwrap();

    // Past the window (successor createdAt + 2s): the cached entry expires.
    tokio::time::sleep(StdDuration::from_millis(1500)).await;
    let result = verifier.verify(&signature, chain.prefix(), chain.id(0), "message").await;
    assert_verify_error!(result, VerifyError::KeyExpired { .. });
}

#[tokio::test]
async fn test_empty_store_reports_identity_not_found() {
    let store = Arc::new(MemoryLogStore::new());
    let config = VerifierConfig::builder()
        .identity("ENoSuchIdentity0000000000000000000000000000x")
        .build();
    let verifier = KeyVerifier::new(store, config);

    let result = verifier.verify("sig", "id", "generation", "message").await;
    assert_verify_error!(result, VerifyError::IdentityNotFound { .. });
}

#[tokio::test]
async fn test_unrelated_identity_not_found() {
    let chain = build_chain(&chain_timestamps(2), None);
    let store = store_with(&chain);

    let config = VerifierConfig::builder()
        .identity("ESomeOtherIdentity0000000000000000000000000x")
        .build();
    let verifier = KeyVerifier::new(store, config);

    let signature = chain.sign(1, "message");
    let result = verifier.verify(&signature, chain.prefix(), chain.id(1), "message").await;
    assert_verify_error!(result, VerifyError::IdentityNotFound { .. });
}

#[tokio::test]
async fn test_two_identities_coexist() {
    let a = build_chain(&chain_timestamps(2), None);
    let b = build_chain(&chain_timestamps(2), None);

    let store = MemoryLogStore::new();
    for (i, entry) in a.entries().iter().chain(b.entries().iter()).enumerate() {
        store.insert(format!("entry-{i}"), entry.record.clone());
    }
    let store = Arc::new(store);

    let config = VerifierConfig::builder().identity(a.prefix()).build();
    let verifier = KeyVerifier::new(store, config);

    let signature = a.sign(1, "message");
    verifier.verify(&signature, a.prefix(), a.id(1), "message").await.unwrap();

    // The other identity's generations are not in this verifier's window.
    let signature = b.sign(1, "message");
    let result = verifier.verify(&signature, b.prefix(), b.id(1), "message").await;
    assert_verify_error!(result, VerifyError::KeyNotFound { .. });
}
