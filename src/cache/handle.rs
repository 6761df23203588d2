//! Cache Handle Module
//!
//! Public entry point bundling a store with its expiration sweeper.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::{CacheStats, Formatter, ItemSnapshot, Store};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::Sweeper;

// == Cache ==
/// An independently lifetimed TTL cache.
///
/// Owns its store and a background sweeper. Several caches with different
/// sweep intervals can live side by side; nothing is shared between them.
/// Dropping the cache stops its sweeper.
///
/// # Example
/// ```ignore
/// let cache: Cache<String> = Cache::new()?;
/// cache.add_item("key", "value".to_string(), Duration::from_secs(5))?;
/// assert_eq!(cache.get_item("key").as_deref(), Some("value"));
/// cache.shutdown().await;
/// ```
#[derive(Debug)]
pub struct Cache<V> {
    store: Arc<Store<V>>,
    sweeper: Sweeper,
}

impl<V> Cache<V>
where
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the default configuration (one second sweeps).
    ///
    /// # Errors
    /// `NoRuntime` when called outside a tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_config(&CacheConfig::default())
    }

    /// Creates a cache using the sweep interval from `config`.
    ///
    /// # Errors
    /// `InvalidConfig` for an unusable config, `NoRuntime` when called
    /// outside a tokio runtime.
    pub fn with_config(config: &CacheConfig) -> Result<Self> {
        config.validate_sweep_interval()?;

        let store = Arc::new(Store::new());
        let sweeper = Sweeper::spawn(Arc::clone(&store), config.sweep_interval)?;
        info!("Cache created with sweep interval {:?}", sweeper.interval());

        Ok(Self { store, sweeper })
    }
}

impl<V> Cache<V> {
    /// Inserts `payload` under `key` unless a live entry already holds it.
    ///
    /// See `Store::add_item`.
    pub fn add_item(&self, key: impl Into<String>, payload: V, ttl: Duration) -> Result<bool> {
        self.store.add_item(key, payload, ttl)
    }

    /// Removes `key`, returning its payload if it was live.
    pub fn remove_item(&self, key: &str) -> Option<V> {
        self.store.remove_item(key)
    }

    /// Sweeps expired entries immediately.
    pub fn delete_expired(&self) -> usize {
        self.store.delete_expired()
    }

    /// Number of entries in the map, unswept expired ones included.
    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<Store<V>> {
        &self.store
    }

    // == Sweeper Lifecycle ==
    /// Tells the sweeper to stop. Expired entries are no longer reclaimed
    /// in the background afterwards, but reads still hide them.
    pub fn shutdown_sweeper(&self) {
        self.sweeper.shutdown();
    }

    /// Stops the sweeper and waits for its task to exit.
    pub async fn shutdown(&self) {
        self.sweeper.shutdown();
        self.sweeper.join().await;
        info!("Cache sweeper shut down");
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweeper.interval()
    }
}

impl<V: Clone> Cache<V> {
    /// Returns a copy of the payload for a live entry.
    pub fn get_item(&self, key: &str) -> Option<V> {
        self.store.get_item(key)
    }

    /// Returns every present entry sorted by key.
    pub fn snapshot(&self) -> Vec<ItemSnapshot<V>> {
        self.store.snapshot()
    }

    /// Formats the sorted snapshot.
    pub fn render<F: Formatter<V>>(&self, formatter: &F) -> Result<String> {
        self.store.render(formatter)
    }
}

impl<V: Clone + Display> Cache<V> {
    /// Returns `(key, rendered value)` pairs sorted by key.
    pub fn get_all_items(&self) -> Vec<(String, String)> {
        self.store.get_all_items()
    }
}
