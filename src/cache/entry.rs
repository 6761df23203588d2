//! Cache Entry Module
//!
//! Defines the immutable record stored per key.

use std::time::Duration;

use tokio::time::Instant;

/// Longest lifetime an entry can get; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A stored payload with its absolute expiration instant.
///
/// Entries are never updated in place. Instants come from the tokio clock so
/// that a paused runtime can drive expiration in tests.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    payload: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after now.
    pub fn new(payload: V, ttl: Duration) -> Self {
        Self::with_expiry(payload, Instant::now() + ttl.min(MAX_TTL))
    }

    /// Creates an entry with an explicit expiration instant.
    pub fn with_expiry(payload: V, expires_at: Instant) -> Self {
        Self {
            payload,
            expires_at,
        }
    }

    /// Returns the stored payload.
    pub fn payload(&self) -> &V {
        &self.payload
    }

    /// Consumes the entry and returns its payload.
    pub fn into_payload(self) -> V {
        self.payload
    }

    /// Returns the expiration instant.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is past its expiration
    /// instant; at the instant itself it is still live.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiration against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
