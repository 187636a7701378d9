//! Example driver: fills an in-memory queue and drains it.
//!
//! Run with: `cargo run -p leaseq-cli -- --items 100 --fail-at 42`

use clap::Parser;
use leaseq_core::{
    DrainOutcome, DrainReport, Drainer, Item, ItemId, JobError, JobResult, LeaseQueue,
    QueueConfig, Result,
};
use leaseq_memory::MemoryBackend;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "leaseq", version, about = "Populate a lease queue and drain it")]
struct Cli {
    /// Number of items to enqueue
    #[arg(long, default_value_t = 100)]
    items: u64,

    /// Lease taken by each claim, in seconds
    #[arg(long, default_value_t = 3600)]
    lease_secs: u64,

    /// Reaper interval, in seconds
    #[arg(long, default_value_t = 60)]
    reaper_interval_secs: u64,

    /// Make the job fail for this item id
    #[arg(long)]
    fail_at: Option<u64>,
}

fn job(fail_at: Option<ItemId>) -> impl Fn(Item<Vec<u64>>) -> std::future::Ready<JobResult> {
    move |item| {
        let result = if Some(item.id) == fail_at {
            Err(JobError::new(format!("job task not executed for item {}", item.id)))
        } else {
            tracing::debug!(item_id = %item.id, len = item.payload.len(), "Job executed");
            Ok(())
        };
        std::future::ready(result)
    }
}

/// Populate a fresh queue and drain it.
async fn run(cli: &Cli) -> Result<DrainReport> {
    let config = QueueConfig::builder()
        .lease_duration(Duration::from_secs(cli.lease_secs))
        .reaper_interval(Duration::from_secs(cli.reaper_interval_secs))
        .build()?;

    let queue = LeaseQueue::new(MemoryBackend::new()).with_config(config);
    queue.create_queue().await?;

    for i in 0..cli.items {
        let data: Vec<u64> = (0..=i + 1).collect();
        queue.create_item(data).await?;
    }
    tracing::info!(items = queue.number_of_items().await?, "Queue populated");

    Drainer::new(queue, job(cli.fail_at.map(ItemId)))
        .run()
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let report = run(&cli).await?;

    match report.outcome {
        DrainOutcome::Drained => tracing::info!(
            processed = report.processed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Queue completed"
        ),
        DrainOutcome::Incomplete { remaining } => {
            tracing::warn!(remaining, "Queue not completed, items left")
        }
        DrainOutcome::JobFailed {
            item_id,
            error,
            remaining,
            ..
        } => tracing::warn!(
            item_id = %item_id,
            error = %error,
            remaining,
            "Queue not completed, job task failed"
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["leaseq"]).unwrap();
        assert_eq!(cli.items, 100);
        assert_eq!(cli.lease_secs, 3600);
        assert_eq!(cli.reaper_interval_secs, 60);
        assert_eq!(cli.fail_at, None);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["leaseq", "--items", "5", "--lease-secs", "30", "--fail-at", "2"])
            .unwrap();
        assert_eq!(cli.items, 5);
        assert_eq!(cli.lease_secs, 30);
        assert_eq!(cli.fail_at, Some(2));
    }

    #[tokio::test]
    async fn test_job_fails_only_at_selected_item() {
        let run = job(Some(ItemId(1)));

        assert!(run(Item::new(ItemId(0), vec![0, 1], 0)).await.is_ok());
        let err = run(Item::new(ItemId(1), vec![0, 1, 2], 0)).await.unwrap_err();
        assert!(err.message.contains("item 1"));
    }

    #[tokio::test]
    async fn test_run_drains_every_item() {
        let cli = Cli::try_parse_from(["leaseq", "--items", "10"]).unwrap();

        let report = run(&cli).await.unwrap();
        assert_eq!(report.processed, 10);
        assert_eq!(report.outcome, DrainOutcome::Drained);
    }

    #[tokio::test]
    async fn test_run_stops_at_failing_item() {
        let cli = Cli::try_parse_from(["leaseq", "--items", "10", "--fail-at", "4"]).unwrap();

        let report = run(&cli).await.unwrap();
        assert_eq!(report.processed, 4);
        assert_eq!(
            report.outcome,
            DrainOutcome::JobFailed {
                item_id: ItemId(4),
                error: "job task not executed for item 4".to_string(),
                released: true,
                remaining: 6,
            }
        );
    }

    #[tokio::test]
    async fn test_run_rejects_zero_reaper_interval() {
        let cli = Cli::try_parse_from(["leaseq", "--reaper-interval-secs", "0"]).unwrap();

        let err = run(&cli).await.unwrap_err();
        assert!(matches!(err, leaseq_core::QueueError::Config(_)));
    }
}
