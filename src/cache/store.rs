//! Cache Store Module
//!
//! Key to entry mapping guarded by a single reader/writer lock.

use std::collections::HashMap;
use std::fmt::Display;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, Formatter, ItemSnapshot};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Thread-safe storage of expiring entries.
///
/// Lookups, counts and snapshots take the lock in shared mode. Every path
/// that writes to the map takes it exclusively. Expired entries stay in the
/// map until a sweep or an explicit removal, but reads treat them as absent.
#[derive(Debug)]
pub struct Store<V> {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Activity counters
    stats: StatsCounters,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    // == Add Item ==
    /// Inserts `payload` under `key` for `ttl`.
    ///
    /// Returns `Ok(true)` when the key was absent or its entry had expired,
    /// and `Ok(false)` when a live entry already holds the key. The live
    /// entry is left untouched in that case. The check and the insert happen
    /// under one exclusive lock, so concurrent adds for the same key cannot
    /// both succeed.
    ///
    /// # Errors
    /// `InvalidKey` for an empty key, `InvalidTtl` for a zero TTL.
    pub fn add_item(&self, key: impl Into<String>, payload: V, ttl: Duration) -> Result<bool> {
        let key = key.into();
        validate_key(&key)?;
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(
                "ttl must be greater than zero".to_string(),
            ));
        }

        let mut entries = self.entries.write();
        if entries.get(&key).is_some_and(|entry| !entry.is_expired()) {
            self.stats.record_rejected();
            return Ok(false);
        }

        entries.insert(key, CacheEntry::new(payload, ttl));
        self.stats.record_insert();
        Ok(true)
    }

    // == Remove Item ==
    /// Removes `key` regardless of its expiration state.
    ///
    /// Returns the payload only if the removed entry was still live.
    pub fn remove_item(&self, key: &str) -> Option<V> {
        let removed = self.entries.write().remove(key)?;
        if removed.is_expired() {
            None
        } else {
            Some(removed.into_payload())
        }
    }

    // == Delete Expired ==
    /// Removes every entry whose expiration instant has passed.
    ///
    /// The clock is read once per sweep and each entry is judged by its own
    /// stored deadline while the exclusive lock is held. Returns the number
    /// of entries removed.
    pub fn delete_expired(&self) -> usize {
        let now = Instant::now();
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired_at(now));
            before - entries.len()
        };

        self.stats.record_swept(removed);
        if removed > 0 {
            debug!("Removed {} expired entries", removed);
        }
        removed
    }

    // == Count ==
    /// Returns the number of entries in the map, unswept expired ones included.
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the map holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.count())
    }
}

impl<V: Clone> Store<V> {
    // == Get Item ==
    /// Returns a copy of the payload for a live entry.
    ///
    /// Missing and expired keys both yield `None`. The map is never modified
    /// here; expired entries are left for the sweeper.
    pub fn get_item(&self, key: &str) -> Option<V> {
        let found = {
            let entries = self.entries.read();
            entries
                .get(key)
                .filter(|entry| !entry.is_expired())
                .map(|entry| entry.payload().clone())
        };

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    // == Snapshot ==
    /// Returns every entry in the map, sorted by key.
    ///
    /// Expired-but-unswept entries are included and flagged. Call
    /// `delete_expired` first to list live entries only.
    pub fn snapshot(&self) -> Vec<ItemSnapshot<V>> {
        let now = Instant::now();
        let wall_now = Utc::now();

        let mut items: Vec<ItemSnapshot<V>> = {
            let entries = self.entries.read();
            entries
                .iter()
                .map(|(key, entry)| ItemSnapshot::capture(key, entry, now, wall_now))
                .collect()
        };
        items.sort_by(|a, b| a.key.cmp(&b.key));
        items
    }

    // == Render ==
    /// Formats the sorted snapshot with the given formatter.
    pub fn render<F: Formatter<V>>(&self, formatter: &F) -> Result<String> {
        formatter.format(&self.snapshot())
    }
}

impl<V: Clone + Display> Store<V> {
    // == Get All Items ==
    /// Returns `(key, rendered value)` pairs sorted by key.
    pub fn get_all_items(&self) -> Vec<(String, String)> {
        self.snapshot()
            .into_iter()
            .map(|item| {
                let rendered = item.value.to_string();
                (item.key, rendered)
            })
            .collect()
    }
}

/// Checks the key preconditions shared by all insert paths.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TextFormatter;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store: Store<String> = Store::new();
        assert_eq!(store.count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_add_and_get() {
        let store = Store::new();

        assert!(store.add_item("key1", "value1".to_string(), TTL).unwrap());
        assert_eq!(store.get_item("key1").as_deref(), Some("value1"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store: Store<String> = Store::new();
        assert!(store.get_item("nonexistent").is_none());
    }

    #[test]
    fn test_store_add_rejects_live_duplicate() {
        let store = Store::new();

        assert!(store.add_item("key1", "value1".to_string(), TTL).unwrap());
        assert!(!store.add_item("key1", "value2".to_string(), TTL).unwrap());

        assert_eq!(store.get_item("key1").as_deref(), Some("value1"));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_add_replaces_expired() {
        let store = Store::new();

        store.add_item("key1", "old".to_string(), Duration::from_secs(1)).unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert!(store.add_item("key1", "new".to_string(), TTL).unwrap());
        assert_eq!(store.get_item("key1").as_deref(), Some("new"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_store_rejects_empty_key() {
        let store = Store::new();
        let result = store.add_item("", 1u8, TTL);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_accepts_long_key() {
        let store = Store::new();
        let long_key = "x".repeat(4096);

        assert!(store.add_item(long_key.clone(), 1u8, TTL).unwrap());
        assert_eq!(store.get_item(&long_key), Some(1));
    }

    #[test]
    fn test_store_rejects_zero_ttl() {
        let store = Store::new();
        let result = store.add_item("key", 1u8, Duration::ZERO);
        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_expired_is_invisible_before_sweep() {
        let store = Store::new();

        store.add_item("key1", "value1".to_string(), Duration::from_secs(1)).unwrap();
        assert!(store.get_item("key1").is_some());

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(store.get_item("key1").is_none());
        // Reads never evict
        assert_eq!(store.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_delete_expired() {
        let store = Store::new();

        store.add_item("key1", "value1".to_string(), Duration::from_secs(1)).unwrap();
        store.add_item("key2", "value2".to_string(), Duration::from_secs(10)).unwrap();
        store.add_item("key3", "value3".to_string(), Duration::from_secs(2)).unwrap();

        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(store.count(), 3);
        let removed = store.delete_expired();
        assert_eq!(removed, 2);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get_item("key2").as_deref(), Some("value2"));
    }

    #[test]
    fn test_store_delete_expired_keeps_live() {
        let store = Store::new();
        store.add_item("key1", 1u32, TTL).unwrap();

        assert_eq!(store.delete_expired(), 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_store_remove_item() {
        let store = Store::new();
        store.add_item("key1", "value1".to_string(), TTL).unwrap();

        assert_eq!(store.remove_item("key1").as_deref(), Some("value1"));
        assert!(store.is_empty());
        assert!(store.remove_item("key1").is_none());

        // Removal frees the key for a fresh add
        assert!(store.add_item("key1", "value2".to_string(), TTL).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_remove_expired_returns_none() {
        let store = Store::new();
        store.add_item("key1", 1u32, Duration::from_secs(1)).unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert!(store.remove_item("key1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_get_all_items_sorted() {
        let store = Store::new();
        for key in ["delta", "alpha", "charlie", "bravo"] {
            store.add_item(key, key.len(), TTL).unwrap();
        }

        let items = store.get_all_items();
        let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "bravo", "charlie", "delta"]);
        assert_eq!(items[0], ("alpha".to_string(), "5".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_snapshot_includes_unswept() {
        let store = Store::new();
        store.add_item("short", 1u32, Duration::from_secs(1)).unwrap();
        store.add_item("long", 2u32, TTL).unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].key, "long");
        assert!(!snapshot[0].expired);
        assert_eq!(snapshot[1].key, "short");
        assert!(snapshot[1].expired);
    }

    #[test]
    fn test_store_render_text() {
        let store = Store::new();
        store.add_item("b", 2u32, TTL).unwrap();
        store.add_item("a", 1u32, TTL).unwrap();

        let dump = store.render(&TextFormatter).unwrap();
        assert_eq!(dump, "\na 1\nb 2\n");
    }

    #[test]
    fn test_store_stats() {
        let store = Store::new();

        store.add_item("key1", "value1".to_string(), TTL).unwrap();
        store.add_item("key1", "value1".to_string(), TTL).unwrap(); // rejected
        store.get_item("key1"); // hit
        store.get_item("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
