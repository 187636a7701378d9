//! Reaper component for stranded item recovery.
//!
//! Claims never look at lease expiry, so an item whose consumer died stays
//! leased forever. The reaper clears leases that have run out, either once on
//! demand or periodically until stopped. Nothing runs it implicitly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::Backend;
use crate::config::QueueConfig;
use crate::error::{QueueError, Result};

/// Reaper that makes items with expired leases claimable again.
pub struct Reaper<B: Backend> {
    backend: B,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl<B: Backend> Reaper<B> {
    /// Create a new reaper. A zero `interval` is rejected.
    pub fn new(backend: B, interval: Duration, running: Arc<AtomicBool>) -> Result<Self> {
        if interval.is_zero() {
            return Err(QueueError::Config(
                "reaper interval must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            backend,
            interval,
            running,
        })
    }

    /// Create a reaper ticking at `config.reaper_interval`.
    pub fn from_config(backend: B, config: &QueueConfig, running: Arc<AtomicBool>) -> Result<Self> {
        Self::new(backend, config.reaper_interval, running)
    }

    /// Time between reclaim passes in [`run`](Self::run).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the reaper loop until `running` is cleared.
    pub async fn run(&self) -> Result<()> {
        tracing::debug!("Reaper started");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            if let Err(e) = self.reap_once().await {
                tracing::error!(error = %e, "Failed to reclaim expired leases");
            }
        }

        tracing::debug!("Reaper stopped");
        Ok(())
    }

    /// Reclaim expired leases once, returning how many items were freed.
    pub async fn reap_once(&self) -> Result<usize> {
        let reclaimed = self.backend.reclaim_expired().await?;

        if reclaimed.is_empty() {
            return Ok(0);
        }

        for id in &reclaimed {
            tracing::debug!(item_id = %id, "Reclaimed stranded item");
        }
        tracing::info!(count = reclaimed.len(), "Reclaimed expired leases");

        Ok(reclaimed.len())
    }
}
