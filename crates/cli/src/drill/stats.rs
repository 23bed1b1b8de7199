//! Drill statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::AlertMetricsAggregator;

/// Statistics from a drill run
#[derive(Debug, Clone, Default)]
pub struct DrillStats {
    /// Events read from the drill file
    pub events_loaded: usize,

    /// Events dispatched successfully
    pub dispatched: u64,

    /// Events whose dispatch failed
    pub failed: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Dispatcher counters at the end of the run
    pub snapshot: MetricsSnapshot,

    /// Per-dispatch aggregate
    pub alert_metrics: AlertMetricsAggregator,
}

impl DrillStats {
    /// Dispatches per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Failed dispatches as a percentage
    pub fn failure_rate(&self) -> f64 {
        let total = self.dispatched + self.failed;
        if total > 0 {
            (self.failed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Drill Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Events loaded: {}", self.events_loaded);
        println!("   ├─ Dispatched: {}", self.dispatched);
        println!("   ├─ Failed: {} ({:.2}%)", self.failed, self.failure_rate());
        println!("   ├─ Rollbacks: {}", self.snapshot.rollback_count);
        println!("   └─ Throughput: {:.2}/s", self.throughput());

        let summary = self.alert_metrics.summary();

        println!("\n📈 Alerts");
        println!("   ├─ Notifications: {}", summary.total_notified);
        println!(
            "   ├─ Second-degree fallbacks: {} ({:.2}%)",
            summary.fallback_dispatches, summary.fallback_rate
        );
        println!(
            "   ├─ Nobody in range: {} ({:.2}%)",
            summary.silent_dispatches, summary.silent_rate
        );
        println!("   ├─ Recipients per alert: {}", summary.recipients_per_alert);
        println!("   └─ Nearest recipient (km): {}", summary.nearest_km);

        if !summary.failure_counts.is_empty() {
            println!("\n⚠️  Failures");
            for (kind, count) in &summary.failure_counts {
                println!("   ├─ {}: {}", kind, count);
            }
        }

        println!();
    }
}
