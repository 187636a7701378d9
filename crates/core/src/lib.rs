//! # leaseq-core - Core types and traits for a lease-based work queue
//!
//! This crate provides the core abstractions for the leaseq work queue:
//! - `Backend` trait for storage implementations
//! - `Item`, `ItemId` types and the `Clock` time sources
//! - `LeaseQueue` for creating, claiming, releasing and deleting items
//! - `Drainer` for walking a queue until nothing is claimable
//! - `Reaper` for recovering items whose lease ran out
//! - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leaseq_core::{Drainer, Item, JobResult, LeaseQueue};
//! use leaseq_memory::MemoryBackend;
//!
//! async fn job(item: Item<String>) -> JobResult {
//!     println!("{}", item.payload);
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> leaseq_core::Result<()> {
//!     let queue = LeaseQueue::new(MemoryBackend::new());
//!     queue.create_item("hello").await?;
//!
//!     let report = Drainer::new(queue, job).run().await?;
//!     assert!(report.is_drained());
//!     Ok(())
//! }
//! ```

mod backend;
mod clock;
mod config;
mod drain;
mod error;
mod item;
mod queue;
mod reaper;

// Re-export main types
pub use backend::{Backend, DynBackend, SharedBackend};
pub use clock::{current_timestamp, lease_expiry, Clock, ManualClock, SystemClock};
pub use config::{QueueConfig, QueueConfigBuilder, DEFAULT_LEASE_DURATION};
pub use drain::{DrainOutcome, DrainReport, Drainer, JobError, JobResult};
pub use error::{QueueError, Result};
pub use item::{Item, ItemId};
pub use queue::LeaseQueue;
pub use reaper::Reaper;
