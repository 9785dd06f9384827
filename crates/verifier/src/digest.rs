//! Content-address digests.
//!
//! Entry ids and rotation commitments are digests in CESR text form: one
//! zero pad byte prepended to the raw hash, base64url-encoded, with the
//! first character replaced by the `E` code. The pad byte guarantees the
//! prefix substitution is lossless, so the full 32 hash bytes survive the
//! 44-character encoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Length of a CESR-encoded digest in characters.
pub const DIGEST_LEN: usize = 44;

/// Computes canonical string digests for content addressing.
///
/// Implementations must be deterministic and collision-resistant; two
/// different inputs mapping to the same output would let an attacker forge
/// entry ids and rotation commitments.
pub trait DigestProvider: Send + Sync {
    /// Returns the canonical digest of `message`.
    fn sum(&self, message: &str) -> String;
}

/// BLAKE3 digest in CESR text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Digest;

impl Blake3Digest {
    /// Creates a new BLAKE3 digest provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DigestProvider for Blake3Digest {
    fn sum(&self, message: &str) -> String {
        let hash = blake3::hash(message.as_bytes());

        // One zero pad byte so the 'E' code replaces only padding.
        let mut padded = Vec::with_capacity(33);
        padded.push(0u8);
        padded.extend_from_slice(hash.as_bytes());

        let encoded = URL_SAFE_NO_PAD.encode(&padded);
        format!("E{}", &encoded[1..])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_shape() {
        let digest = Blake3Digest::new().sum("test message");
        assert!(digest.starts_with('E'));
        assert_eq!(digest.len(), DIGEST_LEN);
    }

    #[test]
    fn test_digest_deterministic() {
        let provider = Blake3Digest::new();
        assert_eq!(provider.sum("test"), provider.sum("test"));
    }

    #[test]
    fn test_digest_distinguishes_inputs() {
        let provider = Blake3Digest::new();
        assert_ne!(provider.sum("test1"), provider.sum("test2"));
    }

    #[test]
    fn test_digest_is_url_safe() {
        let digest = Blake3Digest::new().sum("some input with bytes that hash high");
        assert!(digest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
