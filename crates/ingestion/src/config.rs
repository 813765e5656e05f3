//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub use contracts::DropPolicy;

/// Backpressure configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Channel capacity
    pub channel_capacity: usize,

    /// Drop policy when full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
            drop_policy: DropPolicy::DropOldest,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(channel_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            channel_capacity,
            drop_policy,
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total events received from sensor callbacks
    pub events_received: AtomicU64,

    /// Total events dropped under backpressure
    pub events_dropped: AtomicU64,

    /// Current queue length
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record event received
    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record event dropped
    pub fn record_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Total events received
    pub events_received: u64,

    /// Total events dropped
    pub events_dropped: u64,

    /// Current queue length
    pub queue_len: usize,
}
