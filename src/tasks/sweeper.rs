//! Expiration Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::Store;
use crate::error::{CacheError, Result};

/// Handle to a running sweeper task.
///
/// The task ticks at a fixed interval and calls `Store::delete_expired` on
/// each tick. It stops once `shutdown` is called or the handle is dropped.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    /// Flips to true once the task has left its loop
    done_rx: watch::Receiver<bool>,
    interval: Duration,
}

impl Sweeper {
    /// Spawns the sweeper on the current tokio runtime.
    ///
    /// The first sweep runs one full `interval` after spawning.
    ///
    /// # Errors
    /// `InvalidConfig` if `interval` is zero, `NoRuntime` when called
    /// outside a tokio runtime.
    pub fn spawn<V>(store: Arc<Store<V>>, interval: Duration) -> Result<Self>
    where
        V: Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            CacheError::NoRuntime(
                "the expiration sweeper must be started from within a tokio runtime".to_string(),
            )
        })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        runtime.spawn(async move {
            run(store, interval, shutdown_rx).await;
            done_tx.send_replace(true);
        });

        Ok(Self {
            shutdown_tx,
            done_rx,
            interval,
        })
    }

    /// Returns the tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signals the task to stop. Safe to call more than once.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Returns true while the task has not yet exited.
    pub fn is_running(&self) -> bool {
        // A closed channel means the task is gone
        self.done_rx.has_changed().is_ok() && !*self.done_rx.borrow()
    }

    /// Waits for the task to exit. Any number of callers may wait at once;
    /// each returns only after the loop has stopped.
    ///
    /// Only meaningful after `shutdown`; otherwise it waits forever.
    pub async fn join(&self) {
        let mut done_rx = self.done_rx.clone();
        if done_rx.wait_for(|done| *done).await.is_err() {
            warn!("Sweeper task ended abnormally");
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// Sweep loop: tick, sweep, repeat until the shutdown flag is set.
async fn run<V>(store: Arc<Store<V>>, interval: Duration, mut shutdown_rx: watch::Receiver<bool>)
where
    V: Send + Sync + 'static,
{
    info!("Starting expiration sweeper with interval of {:?}", interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if *shutdown_rx.borrow() {
                    break;
                }
                let removed = store.delete_expired();
                if removed > 0 {
                    info!("Sweep: removed {} expired entries", removed);
                } else {
                    debug!("Sweep: no expired entries found");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiration sweeper stopped");
}
