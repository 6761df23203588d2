//! netcache - A concurrent in-memory TTL cache
//!
//! Reads `<ip> <port>` records from a file or stdin, caches them by source
//! address and prints the cache until shutdown.

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netcache::cache::{JsonFormatter, TextFormatter};
use netcache::ingest::{ingest_lines, IngestSummary};
use netcache::{Cache, CacheConfig, DumpFormat, NetFace};

/// Main entry point for the netcache ingester.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and start its sweeper
/// 4. Ingest records from the file argument or stdin
/// 5. Print the cache contents
/// 6. On SIGINT/SIGTERM stop the sweeper and print the final contents
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting netcache");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: sweep_interval={:?}, default_ttl={:?}, dump_format={:?}",
        config.sweep_interval, config.default_ttl, config.dump_format
    );
    config.validate().context("invalid configuration")?;

    let cache: Arc<Cache<NetFace>> =
        Arc::new(Cache::with_config(&config).context("failed to create cache")?);

    let source = std::env::args().nth(1);
    let ttl = config.default_ttl;
    let summary = {
        let cache = Arc::clone(&cache);
        tokio::task::spawn_blocking(move || -> anyhow::Result<IngestSummary> {
            let summary = match source {
                Some(path) => {
                    let file =
                        File::open(&path).with_context(|| format!("failed to open {}", path))?;
                    ingest_lines(&cache, BufReader::new(file), ttl)?
                }
                None => ingest_lines(&cache, io::stdin().lock(), ttl)?,
            };
            Ok(summary)
        })
        .await
        .context("ingestion task failed")??
    };
    info!("Ingested records: {:?}", summary);

    print_dump(&cache, config.dump_format)?;

    shutdown_signal().await;

    cache.shutdown().await;
    print_dump(&cache, config.dump_format)?;

    info!("netcache shutdown complete");
    Ok(())
}

/// Prints the cache contents in the configured format.
fn print_dump(cache: &Cache<NetFace>, format: DumpFormat) -> anyhow::Result<()> {
    let dump = match format {
        DumpFormat::Text => cache.render(&TextFormatter)?,
        DumpFormat::Json => cache.render(&JsonFormatter { pretty: true })?,
    };
    println!("{}", dump);
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
