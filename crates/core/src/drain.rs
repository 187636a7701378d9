//! Driver loop that drains a lease queue through a job callback.
//!
//! Each claimed item is handed to the callback. Success deletes the item and
//! the loop continues; failure releases the item and stops the loop. The
//! loop also stops once nothing is claimable.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use crate::backend::{Backend, SharedBackend};
use crate::error::{QueueError, Result};
use crate::item::{Item, ItemId};
use crate::queue::LeaseQueue;

/// Result type for job callbacks.
pub type JobResult = std::result::Result<(), JobError>;

/// Error returned from job callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    /// Error message.
    pub message: String,
}

impl JobError {
    /// Create a new job error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E: std::error::Error> From<E> for JobError {
    fn from(err: E) -> Self {
        Self::new(err.to_string())
    }
}

/// How a drain run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing claimable and the queue is empty.
    Drained,
    /// Nothing claimable but items remain, all of them leased.
    Incomplete { remaining: usize },
    /// A job failed and the run stopped.
    ///
    /// `released` is false when the item was already gone or unleased by
    /// the time the drainer tried to release it.
    JobFailed {
        item_id: ItemId,
        error: String,
        released: bool,
        remaining: usize,
    },
}

/// Summary of a drain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Items processed successfully and deleted.
    pub processed: usize,
    /// Wall time spent in the run.
    pub elapsed: Duration,
    /// Why the run stopped.
    pub outcome: DrainOutcome,
}

impl DrainReport {
    /// Whether the run emptied the queue.
    pub fn is_drained(&self) -> bool {
        self.outcome == DrainOutcome::Drained
    }
}

/// Drains a queue one item at a time.
pub struct Drainer<T, F, Fut, B = SharedBackend>
where
    T: DeserializeOwned + Clone + Send + 'static,
    F: Fn(Item<T>) -> Fut + Send + Sync,
    Fut: Future<Output = JobResult> + Send + 'static,
    B: Backend + Clone,
{
    queue: LeaseQueue<B>,
    handler: F,
    lease: Duration,
    _phantom: PhantomData<T>,
}

impl<T, F, Fut, B> Drainer<T, F, Fut, B>
where
    T: DeserializeOwned + Clone + Send + 'static,
    F: Fn(Item<T>) -> Fut + Send + Sync,
    Fut: Future<Output = JobResult> + Send + 'static,
    B: Backend + Clone,
{
    /// Create a drainer using the queue's configured lease duration.
    pub fn new(queue: LeaseQueue<B>, handler: F) -> Self {
        let lease = queue.config().lease_duration;
        Self {
            queue,
            handler,
            lease,
            _phantom: PhantomData,
        }
    }

    /// Override the lease taken for each claim.
    pub fn lease_duration(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    /// The queue being drained.
    pub fn queue(&self) -> &LeaseQueue<B> {
        &self.queue
    }

    /// Run until nothing is claimable or a job fails.
    ///
    /// A job that panics aborts the run with [`QueueError::JobProcessing`]
    /// and its item stays leased.
    pub async fn run(&self) -> Result<DrainReport> {
        let start = Instant::now();
        let mut processed = 0;

        tracing::debug!("Drain started");

        let outcome = loop {
            let item = match self.queue.claim_item_for::<T>(self.lease).await? {
                Some(item) => item,
                None => {
                    let remaining = self.queue.number_of_items().await?;
                    if remaining == 0 {
                        break DrainOutcome::Drained;
                    }
                    break DrainOutcome::Incomplete { remaining };
                }
            };

            let item_id = item.id;
            tracing::debug!(item_id = %item_id, "Processing item");

            let job = tokio::spawn((self.handler)(item.clone()));
            match job.await {
                Ok(Ok(())) => {
                    self.queue.delete_item(&item).await?;
                    processed += 1;
                    tracing::debug!(item_id = %item_id, "Item processed");
                }
                Ok(Err(err)) => {
                    let released = self.queue.release_item(&item).await?;
                    if !released {
                        tracing::warn!(
                            item_id = %item_id,
                            "Failed item was not released, already deleted or unleased"
                        );
                    }
                    let remaining = self.queue.number_of_items().await?;
                    tracing::warn!(
                        item_id = %item_id,
                        error = %err,
                        released,
                        "Item not processed, stopping drain"
                    );
                    break DrainOutcome::JobFailed {
                        item_id,
                        error: err.message,
                        released,
                        remaining,
                    };
                }
                Err(e) => {
                    tracing::error!(item_id = %item_id, error = %e, "Job task panicked");
                    return Err(QueueError::JobProcessing(format!(
                        "job for item {} panicked: {}",
                        item_id, e
                    )));
                }
            }
        };

        let report = DrainReport {
            processed,
            elapsed: start.elapsed(),
            outcome,
        };

        tracing::info!(
            processed = report.processed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            outcome = ?report.outcome,
            "Drain finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_new() {
        let err = JobError::new("boom");
        assert_eq!(err.message, "boom");
        assert_eq!(format!("{}", err), "boom");
    }

    #[test]
    fn test_job_error_from_std_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: JobError = io.into();
        assert_eq!(err.message, "disk gone");
    }

    #[test]
    fn test_drain_report_is_drained() {
        let report = DrainReport {
            processed: 3,
            elapsed: Duration::ZERO,
            outcome: DrainOutcome::Drained,
        };
        assert!(report.is_drained());

        let report = DrainReport {
            processed: 0,
            elapsed: Duration::ZERO,
            outcome: DrainOutcome::Incomplete { remaining: 2 },
        };
        assert!(!report.is_drained());
    }
}
