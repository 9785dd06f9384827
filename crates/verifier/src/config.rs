//! Verifier configuration.

use std::time::Duration;

use bon::Builder;

/// Default server key lifetime (12 hours).
pub const DEFAULT_SERVER_KEY_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

/// Default access grant lifetime (15 minutes).
pub const DEFAULT_ACCESS_GRANT_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// Configuration for a [`KeyVerifier`](crate::KeyVerifier).
///
/// The verification window (how long a superseded generation remains
/// usable) is the sum of the server key lifetime and the access grant
/// lifetime: a grant issued at the last moment of a key's life must remain
/// verifiable for its own full lifetime.
///
/// # Examples
///
/// ```
/// use rotalog_verifier::VerifierConfig;
///
/// let config = VerifierConfig::builder()
///     .identity("EGenesisId000000000000000000000000000000000x")
///     .build();
/// ```
#[derive(Debug, Clone, Builder)]
pub struct VerifierConfig {
    /// The identity prefix whose chain this verifier trusts.
    #[builder(into)]
    identity: String,

    /// How long a server key is used before rotation.
    #[builder(default = DEFAULT_SERVER_KEY_LIFETIME)]
    server_key_lifetime: Duration,

    /// How long an access grant issued under a key remains valid.
    #[builder(default = DEFAULT_ACCESS_GRANT_LIFETIME)]
    access_grant_lifetime: Duration,
}

impl VerifierConfig {
    /// Returns the configured identity prefix.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the server key lifetime.
    #[must_use]
    pub fn server_key_lifetime(&self) -> Duration {
        self.server_key_lifetime
    }

    /// Returns the access grant lifetime.
    #[must_use]
    pub fn access_grant_lifetime(&self) -> Duration {
        self.access_grant_lifetime
    }

    /// Returns the verification window as a chrono duration.
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.server_key_lifetime + self.access_grant_lifetime)
            .unwrap_or(chrono::Duration::MAX)
    }
}
