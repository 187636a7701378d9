//! Typed facade over a lease queue backend.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::backend::{Backend, SharedBackend};
use crate::config::QueueConfig;
use crate::error::Result;
use crate::item::{Item, ItemId};

/// A lease queue owned by its caller.
///
/// Producers call [`create_item`](Self::create_item); a consumer claims an
/// item, processes it, then either deletes it or releases it for another
/// claim. Payloads are stored as JSON.
#[derive(Clone)]
pub struct LeaseQueue<B: Backend + Clone = SharedBackend> {
    backend: B,
    config: QueueConfig,
}

impl LeaseQueue<SharedBackend> {
    /// Create a new queue over a shared backend with default configuration.
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::with_backend(SharedBackend::new(backend))
    }
}

impl<B: Backend + Clone> LeaseQueue<B> {
    /// Create a new queue over a specific backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            config: QueueConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: QueueConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Provision backend storage. A no-op for in-memory backends.
    pub async fn create_queue(&self) -> Result<()> {
        self.backend.create_queue().await
    }

    /// Drop every item and restart ids from zero.
    pub async fn delete_queue(&self) -> Result<()> {
        self.backend.delete_queue().await?;
        tracing::debug!("Queue deleted");
        Ok(())
    }

    /// Add an unleased item to the end of the queue.
    pub async fn create_item<T: Serialize>(&self, payload: T) -> Result<ItemId> {
        let json = serde_json::to_string(&payload)?;
        let id = self.backend.create_item(&json).await?;

        tracing::debug!(item_id = %id, "Item created");
        Ok(id)
    }

    /// Number of items in the queue, leased or not.
    pub async fn number_of_items(&self) -> Result<usize> {
        self.backend.number_of_items().await
    }

    /// Claim the oldest unleased item for the configured lease duration.
    pub async fn claim_item<T: DeserializeOwned>(&self) -> Result<Option<Item<T>>> {
        self.claim_item_for(self.config.lease_duration).await
    }

    /// Claim the oldest unleased item for `lease`.
    ///
    /// Returns `Ok(None)` when nothing is claimable. If the payload does not
    /// decode as `T` the lease is dropped again before the error is returned.
    pub async fn claim_item_for<T: DeserializeOwned>(
        &self,
        lease: Duration,
    ) -> Result<Option<Item<T>>> {
        let raw = match self.backend.claim_item(lease).await? {
            Some(raw) => raw,
            None => {
                tracing::trace!("No claimable item");
                return Ok(None);
            }
        };

        let id = raw.id;
        match raw.decode() {
            Ok(item) => {
                tracing::debug!(item_id = %id, lease_secs = lease.as_secs(), "Item claimed");
                Ok(Some(item))
            }
            Err(e) => {
                tracing::error!(item_id = %id, error = %e, "Failed to decode claimed item, releasing");
                self.backend.release_item(id).await?;
                Err(e.into())
            }
        }
    }

    /// Release a leased item so it can be claimed again.
    ///
    /// Returns `false` if the item was deleted or is not leased.
    pub async fn release_item<T>(&self, item: &Item<T>) -> Result<bool> {
        let released = self.backend.release_item(item.id).await?;
        if released {
            tracing::debug!(item_id = %item.id, "Item released");
        } else {
            tracing::debug!(item_id = %item.id, "Release refused, item missing or not leased");
        }
        Ok(released)
    }

    /// Delete a finished item. Missing items are ignored.
    pub async fn delete_item<T>(&self, item: &Item<T>) -> Result<()> {
        self.backend.delete_item(item.id).await?;
        tracing::debug!(item_id = %item.id, "Item deleted");
        Ok(())
    }

    /// Look up an item without claiming it.
    pub async fn get_item<T: DeserializeOwned>(&self, id: ItemId) -> Result<Option<Item<T>>> {
        match self.backend.get_item(id).await? {
            Some(raw) => Ok(Some(raw.decode()?)),
            None => Ok(None),
        }
    }

    /// Clear every lease that has run out, making those items claimable.
    pub async fn reclaim_expired(&self) -> Result<Vec<ItemId>> {
        let reclaimed = self.backend.reclaim_expired().await?;
        if !reclaimed.is_empty() {
            tracing::info!(count = reclaimed.len(), "Reclaimed expired leases");
        }
        Ok(reclaimed)
    }
}
