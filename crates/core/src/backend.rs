//! Backend abstraction for lease queue storage.
//!
//! This module provides a trait-based abstraction so the queue facade, the
//! drainer and the reaper work against any storage implementation. Payloads
//! cross this seam as JSON text.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::item::{Item, ItemId};

/// Backend trait for lease queue storage operations.
///
/// Implementations must be thread-safe (Send + Sync). `claim_item` must mark
/// the item it returns as leased atomically with respect to other callers.
#[async_trait]
pub trait Backend: Send + Sync {
    // ========== Queue Lifecycle ==========

    /// Provision whatever storage the queue needs. Idempotent.
    async fn create_queue(&self) -> Result<()>;

    /// Remove every item and restart id assignment from zero.
    async fn delete_queue(&self) -> Result<()>;

    // ========== Producer ==========

    /// Store a new unleased item and return its id.
    async fn create_item(&self, payload_json: &str) -> Result<ItemId>;

    // ========== Consumer ==========

    /// Lease the oldest unleased item for `lease`.
    ///
    /// Returns `None` when every stored item is leased, including items
    /// whose lease already expired.
    async fn claim_item(&self, lease: Duration) -> Result<Option<Item<String>>>;

    /// Clear the lease of a leased item.
    ///
    /// Returns `false` if the item is gone or was not leased.
    async fn release_item(&self, id: ItemId) -> Result<bool>;

    /// Remove an item. Unknown ids are ignored.
    async fn delete_item(&self, id: ItemId) -> Result<()>;

    // ========== Admin ==========

    /// Number of stored items, leased or not.
    async fn number_of_items(&self) -> Result<usize>;

    /// Read an item without changing its state.
    async fn get_item(&self, id: ItemId) -> Result<Option<Item<String>>>;

    /// Clear every lease that ended before the current time.
    ///
    /// Returns the ids made claimable again, in queue order.
    async fn reclaim_expired(&self) -> Result<Vec<ItemId>>;
}

/// A type-erased backend that can be shared across threads.
pub type DynBackend = Arc<dyn Backend>;

/// Wrapper around Arc<dyn Backend> for convenience.
#[derive(Clone)]
pub struct SharedBackend {
    inner: DynBackend,
}

impl SharedBackend {
    /// Create a new SharedBackend from any Backend implementation.
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Get a reference to the inner backend.
    pub fn inner(&self) -> &DynBackend {
        &self.inner
    }
}

#[async_trait]
impl Backend for SharedBackend {
    async fn create_queue(&self) -> Result<()> {
        self.inner.create_queue().await
    }

    async fn delete_queue(&self) -> Result<()> {
        self.inner.delete_queue().await
    }

    async fn create_item(&self, payload_json: &str) -> Result<ItemId> {
        self.inner.create_item(payload_json).await
    }

    async fn claim_item(&self, lease: Duration) -> Result<Option<Item<String>>> {
        self.inner.claim_item(lease).await
    }

    async fn release_item(&self, id: ItemId) -> Result<bool> {
        self.inner.release_item(id).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<()> {
        self.inner.delete_item(id).await
    }

    async fn number_of_items(&self) -> Result<usize> {
        self.inner.number_of_items().await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item<String>>> {
        self.inner.get_item(id).await
    }

    async fn reclaim_expired(&self) -> Result<Vec<ItemId>> {
        self.inner.reclaim_expired().await
    }
}
