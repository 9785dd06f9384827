//! Rotation-log key verifier facade.
//!
//! [`KeyVerifier`] answers one question: is this signature, claimed to come
//! from generation `generation_id` of identity `identity`, valid over this
//! message right now? It keeps a cache of trusted generations keyed by
//! generation id and rebuilds it wholesale from the log store on a miss.
//! The rebuild re-proves the entire log from scratch; there is no
//! incremental trust.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rotalog_storage::LogStore;
use tokio::sync::Mutex;

use crate::chain::{build_chains, validate_chains};
use crate::config::VerifierConfig;
use crate::digest::{Blake3Digest, DigestProvider};
use crate::error::{VerifyError, VerifyResult};
use crate::record::PURPOSE_KEY_AUTHORIZATION;
use crate::signature::{P256Verifier, SignatureVerifier};
use crate::window::{CacheEntry, build_window};

/// Verifies messages against the current state of a key-rotation log.
///
/// # Caching
///
/// Lookups hit an in-memory map of generation id to trusted key. A miss
/// triggers a full rebuild: fetch every record, validate every chain,
/// recompute the trust window. Concurrent misses are collapsed into a
/// single rebuild; a failed rebuild leaves the cache empty so the next
/// caller retries. Expiration is evaluated lazily on lookup; there is no
/// background sweeper.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use rotalog_storage::MemoryLogStore;
/// use rotalog_verifier::{KeyVerifier, VerifierConfig};
///
/// async fn example(identity: &str, sig: &str, generation: &str) {
///     let store = Arc::new(MemoryLogStore::new());
///     let config = VerifierConfig::builder().identity(identity).build();
///     let verifier = KeyVerifier::new(store, config);
///     let result = verifier.verify(sig, identity, generation, "message").await;
/// }
/// ```
pub struct KeyVerifier {
    store: Arc<dyn LogStore>,
    digest: Arc<dyn DigestProvider>,
    signatures: Arc<dyn SignatureVerifier>,
    config: VerifierConfig,
    /// Generation id → trusted key. Replaced wholesale on rebuild.
    cache: RwLock<HashMap<String, CacheEntry>>,
    /// Serializes rebuilds so concurrent misses fetch the store once.
    rebuild_lock: Mutex<()>,
}

impl KeyVerifier {
    /// Creates a verifier with the standard BLAKE3 / P-256 providers.
    #[must_use]
    pub fn new(store: Arc<dyn LogStore>, config: VerifierConfig) -> Self {
        Self::with_providers(
            store,
            Arc::new(Blake3Digest::new()),
            Arc::new(P256Verifier::new()),
            config,
        )
    }

    /// Creates a verifier with explicit digest and signature providers.
    #[must_use]
    pub fn with_providers(
        store: Arc<dyn LogStore>,
        digest: Arc<dyn DigestProvider>,
        signatures: Arc<dyn SignatureVerifier>,
        config: VerifierConfig,
    ) -> Self {
        Self {
            store,
            digest,
            signatures,
            config,
            cache: RwLock::new(HashMap::new()),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Verifies `signature` over `message` for the given generation.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::KeyNotFound`] if the generation is unknown or untrusted (tainted,
    ///   outside the window tail, or simply absent) even after a rebuild
    /// - [`VerifyError::IdentityMismatch`] if the generation belongs to a different identity
    /// - [`VerifyError::WrongPurpose`] if the key is not a key-authorization key
    /// - [`VerifyError::KeyExpired`] if the generation's verification window has closed
    /// - [`VerifyError::BadSignature`] if the signature does not verify over `message`
    /// - chain validation errors ([`VerifyError::BrokenChain`] and friends) when a rebuild
    ///   encounters an invalid log
    /// - [`VerifyError::Storage`] if the store failed after bounded retries
    #[tracing::instrument(skip(self, signature, message))]
    pub async fn verify(
        &self,
        signature: &str,
        identity: &str,
        generation_id: &str,
        message: &str,
    ) -> VerifyResult<()> {
        if let Some(entry) = self.lookup(generation_id) {
            tracing::debug!("generation cache hit");
            return self.check_entry(&entry, signature, identity, generation_id, message);
        }

        {
            let _guard = self.rebuild_lock.lock().await;
            // Another caller may have rebuilt while we waited for the lock.
            if self.lookup(generation_id).is_none() {
                tracing::debug!("generation cache miss, rebuilding from store");
                self.rebuild().await?;
            }
        }

        let entry = self
            .lookup(generation_id)
            .ok_or_else(|| VerifyError::key_not_found(generation_id))?;
        self.check_entry(&entry, signature, identity, generation_id, message)
    }

    /// Returns the number of generations currently cached.
    #[must_use]
    pub fn cached_generations(&self) -> usize {
        self.cache.read().len()
    }

    /// Releases the underlying store connection.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Storage`] if the store fails to close.
    pub async fn close(&self) -> VerifyResult<()> {
        Ok(self.store.close().await?)
    }

    fn lookup(&self, generation_id: &str) -> Option<CacheEntry> {
        self.cache.read().get(generation_id).cloned()
    }

    /// Refetches the whole log, re-proves it and replaces the cache.
    ///
    /// The cache is cleared before fetching: on any failure it stays empty,
    /// never holding state derived from a log that failed validation.
    async fn rebuild(&self) -> VerifyResult<()> {
        self.cache.write().clear();

        let keys = self.store.list_keys().await?;
        let values = self.store.bulk_get(&keys).await?;

        let now = Utc::now();
        let chains = build_chains(values)?;
        validate_chains(&chains, self.digest.as_ref(), self.signatures.as_ref(), now)?;

        let chain = chains
            .get(self.config.identity())
            .ok_or_else(|| VerifyError::identity_not_found(self.config.identity()))?;
        let window = build_window(chain, self.config.window(), now);

        tracing::debug!(generations = window.len(), "trust window rebuilt");
        *self.cache.write() = window;
        Ok(())
    }

    fn check_entry(
        &self,
        cached: &CacheEntry,
        signature: &str,
        identity: &str,
        generation_id: &str,
        message: &str,
    ) -> VerifyResult<()> {
        if cached.entry.prefix != identity {
            return Err(VerifyError::identity_mismatch(identity, &cached.entry.prefix));
        }

        if cached.entry.purpose != PURPOSE_KEY_AUTHORIZATION {
            return Err(VerifyError::wrong_purpose(&cached.entry.purpose));
        }

        if cached.is_expired(Utc::now()) {
            return Err(VerifyError::key_expired(generation_id));
        }

        self.signatures.verify(message, signature, &cached.entry.public_key)
    }
}

impl std::fmt::Debug for KeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVerifier")
            .field("identity", &self.config.identity())
            .field("cached_generations", &self.cached_generations())
            .finish_non_exhaustive()
    }
}
