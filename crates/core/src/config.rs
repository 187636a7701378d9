//! Configuration types for the lease queue.

use std::time::Duration;

use crate::error::{QueueError, Result};

/// Lease applied by `claim_item` when the caller does not pick one.
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(3600);

/// Configuration for a LeaseQueue and the components driving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Lease taken by each claim.
    pub lease_duration: Duration,
    /// Interval for the reaper loop.
    pub reaper_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            lease_duration: DEFAULT_LEASE_DURATION,
            reaper_interval: Duration::from_secs(60),
        }
    }
}

impl QueueConfig {
    /// Create a new builder.
    pub fn builder() -> QueueConfigBuilder {
        QueueConfigBuilder::new()
    }

    /// Check values that would stall a running component.
    pub fn validate(&self) -> Result<()> {
        if self.reaper_interval.is_zero() {
            return Err(QueueError::Config(
                "reaper interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for QueueConfig.
#[derive(Debug, Default)]
pub struct QueueConfigBuilder {
    config: QueueConfig,
}

impl QueueConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default lease duration.
    pub fn lease_duration(mut self, lease: Duration) -> Self {
        self.config.lease_duration = lease;
        self
    }

    /// Set the reaper interval.
    pub fn reaper_interval(mut self, interval: Duration) -> Self {
        self.config.reaper_interval = interval;
        self
    }

    /// Build and validate the QueueConfig.
    pub fn build(self) -> Result<QueueConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
