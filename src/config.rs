//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Output format for the diagnostic dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    /// One `key value` line per entry
    #[default]
    Text,
    /// JSON array of item snapshots
    Json,
}

impl FromStr for DumpFormat {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(DumpFormat::Text),
            "json" => Ok(DumpFormat::Json),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown dump format '{}'",
                other
            ))),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Sweeper tick interval
    pub sweep_interval: Duration,
    /// TTL applied to ingested records
    pub default_ttl: Duration,
    /// Format used when printing the cache contents
    pub dump_format: DumpFormat,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL_MS` - Sweeper tick in milliseconds (default: 1000)
    /// - `DEFAULT_TTL` - Ingestion TTL in seconds (default: 300)
    /// - `DUMP_FORMAT` - `text` or `json` (default: text)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval: env::var("SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            dump_format: env::var("DUMP_FORMAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dump_format),
        }
    }

    /// Sets the sweeper tick interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the ingestion TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Rejects a sweep interval the sweeper cannot tick at.
    pub fn validate_sweep_interval(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Rejects values the ingester cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.validate_sweep_interval()?;
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default TTL must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(1),
            default_ttl: Duration::from_secs(300),
            dump_format: DumpFormat::Text,
        }
    }
}
