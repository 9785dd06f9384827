//! Sliding trust window over a validated chain.
//!
//! Chain validation proves the log is internally consistent; the window
//! decides which generations are *currently* usable. Walking newest to
//! oldest, each generation stays valid until its successor's creation time
//! plus the verification window; the newest generation never expires on
//! its own. A taint marker cuts the walk short: nothing older than the
//! newest recovery event is ever trusted again.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::record::{LogEntry, RawEntry};

/// A trusted generation with its computed expiration.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The validated log entry.
    pub entry: LogEntry,
    /// When this generation stops being usable. `None` for the newest
    /// generation, which remains valid until superseded.
    pub expiration: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Returns `true` if this generation's window has closed.
    ///
    /// The boundary is exclusive: an expiration equal to `now` is expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }
}

/// Builds the generation-id cache for one validated chain.
///
/// Walks the chain newest to oldest, carrying the expiration computed from
/// each entry's `created_at` down to its predecessor. The walk stops at the
/// first taint marker (the marker itself is cached, everything older is
/// not) or once the running expiration is already past.
#[must_use]
pub fn build_window(
    chain: &[RawEntry],
    window: Duration,
    now: DateTime<Utc>,
) -> HashMap<String, CacheEntry> {
    let mut cache = HashMap::new();
    let mut expiration: Option<DateTime<Utc>> = None;

    for raw in chain.iter().rev() {
        let payload = raw.payload();

        cache.insert(payload.id.clone(), CacheEntry { entry: payload.clone(), expiration });

        if payload.taint_previous == Some(true) {
            tracing::debug!(id = %payload.id, "taint marker reached, truncating trust window");
            break;
        }

        let successor_deadline = payload.created_at + window;
        expiration = Some(successor_deadline);

        if successor_deadline <= now {
            break;
        }
    }

    cache
}
