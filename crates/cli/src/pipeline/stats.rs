//! Dispatch run statistics.

use std::time::Duration;

use dispatcher::RunSummary;
use observability::DispatchMetricsAggregator;

/// Statistics from one dispatch run
#[derive(Debug, Clone)]
pub struct DispatchStats {
    /// Items the coordinator discovered and broadcast
    pub discovered: usize,

    /// Number of cooperating workers
    pub workers: usize,

    /// Wall-clock duration, discovery through final rendezvous
    pub duration: Duration,

    /// Per-flavor outcome counts
    pub summary: RunSummary,

    /// Item timing and failure statistics
    pub run_metrics: DispatchMetricsAggregator,
}

impl DispatchStats {
    /// Whether any item failed
    pub fn has_failures(&self) -> bool {
        self.summary.has_failures()
    }

    /// Throughput in items per minute
    pub fn items_per_minute(&self) -> f64 {
        let minutes = self.duration.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.discovered as f64 / minutes
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n==============================================================");
        println!("                    Dispatch Statistics");
        println!("==============================================================\n");

        println!("Overview");
        println!("   |- Duration: {:.1} min", self.summary.wall_minutes());
        println!("   |- Workers: {}", self.workers);
        println!("   |- Items dispatched: {}", self.discovered);
        println!("   |- Items failed: {}", self.summary.failed);
        println!("   `- Throughput: {:.2} items/min", self.items_per_minute());

        println!("\nBy flavor");
        let flavors: Vec<_> = self.summary.by_flavor.iter().collect();
        for (i, (flavor, counts)) in flavors.iter().enumerate() {
            let prefix = if i == flavors.len() - 1 { "`-" } else { "|-" };
            println!(
                "   {} {}: {} total, {} succeeded, {} failed, {} dry-run",
                prefix,
                flavor,
                counts.total(),
                counts.succeeded,
                counts.failed,
                counts.dry_run
            );
        }
        if flavors.is_empty() {
            println!("   `- (nothing dispatched)");
        }

        println!("\n{}", self.run_metrics.summary());
    }
}
