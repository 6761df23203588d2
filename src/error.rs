//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Normal cache outcomes are not errors: a duplicate live key makes
/// `add_item` return `Ok(false)` and a missing or expired key makes
/// `get_item` return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// TTL is zero
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No tokio runtime available to host the sweeper
    #[error("No runtime: {0}")]
    NoRuntime(String),

    /// Producer record could not be parsed
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Producer input could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Snapshot could not be rendered
    #[error("Render failed: {0}")]
    Render(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Render(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
