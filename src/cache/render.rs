//! Snapshot rendering
//!
//! Presentation layer over `Store::snapshot`. Formatters only see the sorted
//! item list, never the store itself.

use std::fmt::{Display, Write};

use serde::Serialize;

use crate::cache::ItemSnapshot;
use crate::error::{CacheError, Result};

/// Turns a sorted snapshot into display text.
pub trait Formatter<V> {
    fn format(&self, items: &[ItemSnapshot<V>]) -> Result<String>;
}

/// Plain dump: a leading blank line, then `key value` per entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl<V: Display> Formatter<V> for TextFormatter {
    fn format(&self, items: &[ItemSnapshot<V>]) -> Result<String> {
        let mut out = String::from("\n");
        for item in items {
            writeln!(out, "{} {}", item.key, item.value)
                .map_err(|e| CacheError::Render(e.to_string()))?;
        }
        Ok(out)
    }
}

/// JSON array of snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl<V: Serialize> Formatter<V> for JsonFormatter {
    fn format(&self, items: &[ItemSnapshot<V>]) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(items)?
        } else {
            serde_json::to_string(items)?
        };
        Ok(json)
    }
}
