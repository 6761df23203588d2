//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and background sweeping.

mod entry;
mod handle;
mod render;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, MAX_TTL};
pub use handle::Cache;
pub use render::{Formatter, JsonFormatter, TextFormatter};
pub use snapshot::ItemSnapshot;
pub use stats::CacheStats;
pub use store::Store;
