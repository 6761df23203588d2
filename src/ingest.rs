//! Ingestion Module
//!
//! Producer side of the cache: turns observed `(address, port)` records into
//! cache insertions keyed by a digest of the source address.

use std::io::BufRead;
use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;
use sha3::{Digest, Sha3_256};
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::{CacheError, Result};
use crate::models::NetFace;

/// TTL for records read from capture files.
pub const CAPTURE_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for interactive sessions and tests.
pub const INTERACTIVE_TTL: Duration = Duration::from_secs(5);

/// Derives the cache key for an address.
///
/// Lowercase hex of the SHA3-256 digest of the textual address, so every
/// key is 64 characters long and the same address always maps to the same
/// key. Keys are not interchangeable with 32-character MD5-derived keys
/// produced by other tools for the same address.
pub fn address_key(ip: &IpAddr) -> String {
    hex::encode(Sha3_256::digest(ip.to_string().as_bytes()))
}

/// Parses a `<ip> <port>` record.
pub fn parse_record(line: &str) -> Result<NetFace> {
    let mut fields = line.split_whitespace();
    let (Some(ip), Some(port), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(CacheError::InvalidRecord(format!(
            "expected '<ip> <port>', got '{}'",
            line.trim()
        )));
    };

    let src_ip: IpAddr = ip
        .parse()
        .map_err(|_| CacheError::InvalidRecord(format!("invalid address '{}'", ip)))?;
    let dst_port: u16 = port
        .parse()
        .map_err(|_| CacheError::InvalidRecord(format!("invalid port '{}'", port)))?;

    Ok(NetFace::new(src_ip, dst_port))
}

/// Caches a connection under its address key.
///
/// Returns `Ok(false)` when the address is already cached and still live.
pub fn cache_connection(cache: &Cache<NetFace>, face: NetFace, ttl: Duration) -> Result<bool> {
    let key = address_key(&face.src_ip);
    cache.add_item(key, face, ttl)
}

/// Outcome counts for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Records inserted into the cache
    pub added: usize,
    /// Records whose address was already cached
    pub already_cached: usize,
    /// Lines that could not be parsed
    pub skipped: usize,
}

/// Reads records line by line and caches each one.
///
/// Blank lines and `#` comments are ignored. Malformed lines are logged and
/// skipped. Read failures abort the run.
pub fn ingest_lines<R: BufRead>(
    cache: &Cache<NetFace>,
    reader: R,
    ttl: Duration,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let face = match parse_record(trimmed) {
            Ok(face) => face,
            Err(err) => {
                warn!("Skipping line {}: {}", index + 1, err);
                summary.skipped += 1;
                continue;
            }
        };

        if cache_connection(cache, face, ttl)? {
            debug!("Cached {}", face);
            summary.added += 1;
        } else {
            summary.already_cached += 1;
        }
    }

    info!(
        "Ingestion finished: added={}, already_cached={}, skipped={}",
        summary.added, summary.already_cached, summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_address_key_is_stable_and_fixed_length() {
        let ip: IpAddr = "192.168.0.1".parse().unwrap();
        let key = address_key(&ip);

        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(key, address_key(&ip));
        assert_ne!(key, address_key(&"192.168.0.2".parse().unwrap()));
    }

    #[test]
    fn test_parse_record() {
        let face = parse_record("192.168.0.1 80").unwrap();
        assert_eq!(face, NetFace::new("192.168.0.1".parse().unwrap(), 80));

        let face = parse_record("  ::1\t8080 ").unwrap();
        assert_eq!(face.dst_port, 8080);
    }

    #[test]
    fn test_parse_record_errors() {
        assert!(matches!(parse_record("192.168.0.1"), Err(CacheError::InvalidRecord(_))));
        assert!(matches!(parse_record("nope 80"), Err(CacheError::InvalidRecord(_))));
        assert!(matches!(parse_record("10.0.0.1 70000"), Err(CacheError::InvalidRecord(_))));
        assert!(matches!(parse_record("10.0.0.1 80 extra"), Err(CacheError::InvalidRecord(_))));
    }

    #[tokio::test]
    async fn test_cache_connection_dedupes_by_address() {
        let cache = Cache::new().unwrap();
        let ip: IpAddr = "10.1.1.1".parse().unwrap();

        assert!(cache_connection(&cache, NetFace::new(ip, 80), INTERACTIVE_TTL).unwrap());
        // Same source, different port: still the same key
        assert!(!cache_connection(&cache, NetFace::new(ip, 443), INTERACTIVE_TTL).unwrap());

        assert_eq!(cache.get_item(&address_key(&ip)), Some(NetFace::new(ip, 80)));
        cache.shutdown().await;
    }

    #[tokio::test]
    async fn test_ingest_lines() {
        let cache = Cache::new().unwrap();
        let input = "\
# capture excerpt
192.168.0.1 80
10.0.0.5 443

192.168.0.1 8080
garbage
10.0.0.9 22
";

        let summary = ingest_lines(&cache, Cursor::new(input), CAPTURE_TTL).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                added: 3,
                already_cached: 1,
                skipped: 1,
            }
        );
        assert_eq!(cache.count(), 3);
        cache.shutdown().await;
    }
}
