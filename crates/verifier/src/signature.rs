//! Payload and message signature verification.
//!
//! Keys and signatures travel in CESR text form. A public key is the `1AAI`
//! code followed by the base64url encoding of a compressed SEC1 point; a
//! signature is the base64url encoding of two zero pad bytes followed by
//! the fixed-width `r ‖ s` scalars, with the first two characters rewritten
//! to the `0I` code. In both cases the whole string decodes as one base64
//! unit and the pad bytes are skipped, so no textual prefix stripping is
//! needed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};

use crate::error::{VerifyError, VerifyResult};

/// Pad bytes preceding the compressed point in a decoded public key.
const PUBLIC_KEY_PAD: usize = 3;

/// Pad bytes preceding `r ‖ s` in a decoded signature.
const SIGNATURE_PAD: usize = 2;

/// Verifies detached signatures over UTF-8 messages.
pub trait SignatureVerifier: Send + Sync {
    /// Verifies `signature` over `message` with `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::BadSignature`] on any decode or verification
    /// failure.
    fn verify(&self, message: &str, signature: &str, public_key: &str) -> VerifyResult<()>;
}

/// ECDSA/P-256 verifier for CESR-encoded keys and signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct P256Verifier;

impl P256Verifier {
    /// Creates a new P-256 verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SignatureVerifier for P256Verifier {
    fn verify(&self, message: &str, signature: &str, public_key: &str) -> VerifyResult<()> {
        let key_bytes = URL_SAFE
            .decode(public_key)
            .map_err(|e| VerifyError::bad_signature(format!("public key decode: {e}")))?;
        if key_bytes.len() <= PUBLIC_KEY_PAD {
            return Err(VerifyError::bad_signature("public key too short"));
        }

        let verifying_key = VerifyingKey::from_sec1_bytes(&key_bytes[PUBLIC_KEY_PAD..])
            .map_err(|e| VerifyError::bad_signature(format!("public key import: {e}")))?;

        let sig_bytes = URL_SAFE
            .decode(signature)
            .map_err(|e| VerifyError::bad_signature(format!("signature decode: {e}")))?;
        if sig_bytes.len() <= SIGNATURE_PAD {
            return Err(VerifyError::bad_signature("signature too short"));
        }

        let signature = Signature::from_slice(&sig_bytes[SIGNATURE_PAD..])
            .map_err(|e| VerifyError::bad_signature(format!("signature parse: {e}")))?;

        verifying_key
            .verify(message.as_bytes(), &signature)
            .map_err(|_| VerifyError::bad_signature("invalid signature"))
    }
}
