//! Sink metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Total records accepted into the queue
    enqueued: AtomicU64,
    /// Total successful writes
    written: AtomicU64,
    /// Total write failures
    failures: AtomicU64,
    /// Total records dropped due to full queue
    dropped: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current queue length
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set current queue length
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get enqueued record count
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Increment enqueued record count
    pub fn inc_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Get successful write count
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Increment successful write count
    pub fn inc_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    /// Get write failure count
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Increment write failure count
    pub fn inc_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped record count
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Increment dropped record count
    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a consistent snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            enqueued: self.enqueued(),
            written: self.written(),
            failures: self.failures(),
            dropped: self.dropped(),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub enqueued: u64,
    pub written: u64,
    pub failures: u64,
    pub dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counter_updates() {
        let metrics = SinkMetrics::new();
        metrics.inc_enqueued();
        metrics.inc_enqueued();
        metrics.inc_written();
        metrics.inc_failure();
        metrics.inc_dropped();
        metrics.set_queue_len(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queue_len, 3);
        assert_eq!(snapshot.enqueued, 2);
        assert_eq!(snapshot.written, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.dropped, 1);
    }
}
