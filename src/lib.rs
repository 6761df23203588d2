//! netcache - A concurrent in-memory TTL cache
//!
//! Entries expire after a per-item TTL, become invisible to readers as soon
//! as they expire, and are reclaimed by a background sweeper that stops with
//! its cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod tasks;

pub use cache::{Cache, CacheStats, ItemSnapshot, Store};
pub use config::{CacheConfig, DumpFormat};
pub use error::{CacheError, Result};
pub use models::NetFace;
