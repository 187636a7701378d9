//! Time sources for creation stamps and lease expiry.
//!
//! All timestamps are Unix epoch seconds.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of the current time for a backend.
pub trait Clock: Send + Sync + Debug {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        current_timestamp()
    }
}

/// Manually driven clock. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    /// Set the current reading.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(duration_secs(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(duration_secs)
        .unwrap_or(0)
}

/// Whole seconds of `d`, clamped to `i64::MAX`.
pub fn duration_secs(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}

/// Absolute expiry for a lease of `lease` starting at `now`.
pub fn lease_expiry(now: i64, lease: Duration) -> i64 {
    now.saturating_add(duration_secs(lease))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp() {
        let ts = current_timestamp();
        // Should be a reasonable Unix timestamp (after year 2020)
        assert!(ts > 1577836800);
    }

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let before = current_timestamp();
        let now = SystemClock.now();
        let after = current_timestamp();
        assert!(now >= before && now <= after);
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);

        clock.advance(Duration::from_secs(30));
        assert_eq!(clock.now(), 1_030);

        clock.set(5);
        assert_eq!(clock.now(), 5);
    }

    #[test]
    fn test_manual_clock_clones_share_reading() {
        let clock = ManualClock::new(0);
        let other = clock.clone();
        other.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_lease_expiry_saturates() {
        assert_eq!(lease_expiry(100, Duration::from_secs(3600)), 3700);
        assert_eq!(lease_expiry(i64::MAX - 1, Duration::from_secs(10)), i64::MAX);
        assert_eq!(lease_expiry(0, Duration::from_secs(u64::MAX)), i64::MAX);
    }

    #[test]
    fn test_duration_secs_truncates_subsecond() {
        assert_eq!(duration_secs(Duration::from_millis(1999)), 1);
    }
}
