//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::AlignMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total combined records produced
    pub records_combined: u64,

    /// Total sensor events received from ingestion
    pub events_received: u64,

    /// Total events dropped under backpressure
    pub events_dropped: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of channels that were active
    pub active_channels: usize,

    /// Number of sinks that received records
    pub active_sinks: usize,

    /// Aligner metrics aggregator
    pub align_metrics: AlignMetricsAggregator,
}

impl PipelineStats {
    /// Combined records per second
    pub fn records_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_combined as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Combined records: {}", self.records_combined);
        println!("   ├─ Events received: {}", self.events_received);
        println!("   ├─ Events dropped: {}", self.events_dropped);
        println!("   ├─ Records/s: {:.2}", self.records_per_sec());
        println!("   ├─ Active channels: {}", self.active_channels);
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.align_metrics.summary();

        println!("\n📈 Alignment Metrics");
        println!("   ├─ Reused readings: {}", summary.total_reused);
        println!("   ├─ Overwritten updates: {}", summary.total_overwritten);
        println!(
            "   ├─ Records with stale reuse: {} ({:.2}%)",
            summary.records_with_reuse, summary.reuse_rate
        );
        println!("   └─ Emit interval (ms): {}", summary.interval_ms);

        if !summary.channel_reuse_counts.is_empty() {
            println!("\n⚠️  Stale Reuse by Channel");
            for (channel, count) in &summary.channel_reuse_counts {
                println!("   ├─ {}: {}", channel, count);
            }
        }

        println!();
    }
}
