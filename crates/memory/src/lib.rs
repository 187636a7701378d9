//! In-memory backend for the leaseq work queue.
//!
//! State lives in the process and is lost when it exits. Clones share the
//! same queue, and every operation runs under a single lock, so a claim's
//! scan-then-lease step is atomic across tasks and threads.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leaseq_core::LeaseQueue;
//! use leaseq_memory::MemoryBackend;
//!
//! let queue = LeaseQueue::new(MemoryBackend::new());
//! ```

use async_trait::async_trait;
use leaseq_core::{lease_expiry, Backend, Clock, Item, ItemId, Result, SystemClock};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// In-memory backend for lease queue storage.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct State {
    /// Ids only grow, so key order is insertion order.
    items: BTreeMap<u64, Item<String>>,
    /// Ids of stored items with no lease.
    unleased: BTreeSet<u64>,
    next_id: u64,
}

impl State {
    fn clear(&mut self) {
        self.items.clear();
        self.unleased.clear();
        self.next_id = 0;
    }
}

impl MemoryBackend {
    /// Create an empty backend on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty backend reading time from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock: Arc::new(clock),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryBackend")
            .field("items", &state.items.len())
            .field("unleased", &state.unleased.len())
            .field("next_id", &state.next_id)
            .field("clock", &self.clock)
            .finish()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_queue(&self) -> Result<()> {
        Ok(())
    }

    async fn delete_queue(&self) -> Result<()> {
        self.state.lock().clear();
        Ok(())
    }

    async fn create_item(&self, payload_json: &str) -> Result<ItemId> {
        let created_at = self.clock.now();
        let mut state = self.state.lock();

        let id = state.next_id;
        state.next_id += 1;
        state.items.insert(
            id,
            Item::new(ItemId(id), payload_json.to_string(), created_at),
        );
        state.unleased.insert(id);

        Ok(ItemId(id))
    }

    async fn claim_item(&self, lease: Duration) -> Result<Option<Item<String>>> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        while let Some(id) = state.unleased.pop_first() {
            if let Some(item) = state.items.get_mut(&id) {
                item.lease_expiry = Some(lease_expiry(now, lease));
                return Ok(Some(item.clone()));
            }
            tracing::warn!(item_id = id, "Unleased index pointed at a missing item");
        }

        Ok(None)
    }

    async fn release_item(&self, id: ItemId) -> Result<bool> {
        let mut state = self.state.lock();

        let released = match state.items.get_mut(&id.0) {
            Some(item) if item.is_leased() => {
                item.lease_expiry = None;
                true
            }
            _ => false,
        };
        if released {
            state.unleased.insert(id.0);
        }

        Ok(released)
    }

    async fn delete_item(&self, id: ItemId) -> Result<()> {
        let mut state = self.state.lock();
        state.items.remove(&id.0);
        state.unleased.remove(&id.0);
        Ok(())
    }

    async fn number_of_items(&self) -> Result<usize> {
        Ok(self.state.lock().items.len())
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item<String>>> {
        Ok(self.state.lock().items.get(&id.0).cloned())
    }

    async fn reclaim_expired(&self) -> Result<Vec<ItemId>> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        let mut reclaimed = Vec::new();
        for item in state.items.values_mut() {
            if item.is_lease_expired(now) {
                item.lease_expiry = None;
                reclaimed.push(item.id);
            }
        }
        state.unleased.extend(reclaimed.iter().map(|id| id.0));

        Ok(reclaimed)
    }
}
