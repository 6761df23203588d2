//! Item Snapshot Module
//!
//! Structured, ordered view of the store used for diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::cache::CacheEntry;

/// One entry as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot<V> {
    /// The entry key
    pub key: String,
    /// A copy of the stored payload
    pub value: V,
    /// Wall-clock expiration, derived from the monotonic deadline
    pub expires_at: DateTime<Utc>,
    /// True when the entry is logically expired but not yet swept
    pub expired: bool,
}

impl<V: Clone> ItemSnapshot<V> {
    /// Captures an entry relative to a shared pair of clock readings.
    pub(crate) fn capture(
        key: &str,
        entry: &CacheEntry<V>,
        now: Instant,
        wall_now: DateTime<Utc>,
    ) -> Self {
        let deadline = entry.expires_at();
        let expires_at = if deadline >= now {
            chrono::Duration::from_std(deadline - now)
                .ok()
                .and_then(|delta| wall_now.checked_add_signed(delta))
        } else {
            chrono::Duration::from_std(now - deadline)
                .ok()
                .and_then(|delta| wall_now.checked_sub_signed(delta))
        };

        Self {
            key: key.to_string(),
            value: entry.payload().clone(),
            expires_at: expires_at.unwrap_or(wall_now),
            expired: entry.is_expired_at(now),
        }
    }
}
