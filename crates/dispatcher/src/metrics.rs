//! Dispatcher metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Total committed dispatches
    dispatch_count: AtomicU64,
    /// Total notifications written by dispatches
    notified_count: AtomicU64,
    /// Dispatches that fell back to second-degree contacts
    fallback_count: AtomicU64,
    /// Total failed operations
    failure_count: AtomicU64,
    /// Transactions rolled back
    rollback_count: AtomicU64,
    /// Notifications delivered through inbox reads
    inbox_read_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total dispatch count
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Relaxed)
    }

    /// Record one committed dispatch
    pub fn record_dispatch(&self, notified: usize, fallback: bool) {
        self.dispatch_count.fetch_add(1, Ordering::Relaxed);
        self.notified_count
            .fetch_add(notified as u64, Ordering::Relaxed);
        if fallback {
            self.fallback_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get notified count
    pub fn notified_count(&self) -> u64 {
        self.notified_count.load(Ordering::Relaxed)
    }

    /// Get fallback count
    pub fn fallback_count(&self) -> u64 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get rollback count
    pub fn rollback_count(&self) -> u64 {
        self.rollback_count.load(Ordering::Relaxed)
    }

    /// Increment rollback count
    pub fn inc_rollback_count(&self) {
        self.rollback_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get inbox read count
    pub fn inbox_read_count(&self) -> u64 {
        self.inbox_read_count.load(Ordering::Relaxed)
    }

    /// Add delivered inbox entries
    pub fn add_inbox_reads(&self, count: usize) {
        self.inbox_read_count
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatch_count: self.dispatch_count(),
            notified_count: self.notified_count(),
            fallback_count: self.fallback_count(),
            failure_count: self.failure_count(),
            rollback_count: self.rollback_count(),
            inbox_read_count: self.inbox_read_count(),
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dispatch_count: u64,
    pub notified_count: u64,
    pub fallback_count: u64,
    pub failure_count: u64,
    pub rollback_count: u64,
    pub inbox_read_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let metrics = DispatchMetrics::new();
        metrics.record_dispatch(2, false);
        metrics.record_dispatch(1, true);
        metrics.inc_failure_count();
        metrics.inc_rollback_count();
        metrics.add_inbox_reads(3);

        let snap = metrics.snapshot();
        assert_eq!(snap.dispatch_count, 2);
        assert_eq!(snap.notified_count, 3);
        assert_eq!(snap.fallback_count, 1);
        assert_eq!(snap.failure_count, 1);
        assert_eq!(snap.rollback_count, 1);
        assert_eq!(snap.inbox_read_count, 3);
    }
}
