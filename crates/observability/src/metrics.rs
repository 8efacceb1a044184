//! Dispatch metrics collection.
//!
//! Records per-item outcomes to the Prometheus recorder and aggregates them
//! in memory for the end-of-run report.

use contracts::{RunResult, RunStatus};
use metrics::{counter, gauge, histogram};

/// Record the outcome of one dispatch attempt.
///
/// Called once per `RunResult` during aggregation on the coordinator.
pub fn record_item_result(result: &RunResult) {
    let flavor = result.item.flavor.label().to_string();
    let status = match &result.status {
        RunStatus::Succeeded => "success",
        RunStatus::Failed { timed_out: true, .. } => "timeout",
        RunStatus::Failed { .. } => "failure",
        RunStatus::DryRun => "dry_run",
    };

    counter!(
        "fastframe_dispatch_items_total",
        "flavor" => flavor.clone(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "fastframe_dispatch_item_seconds",
        "flavor" => flavor
    )
    .record(result.elapsed.as_secs_f64());
}

/// Record an exposure filtered out during discovery.
pub fn record_exposure_skipped(reason: &str) {
    counter!(
        "fastframe_dispatch_exposures_skipped_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record one worker completing its loop.
pub fn record_worker_finished(worker: usize, attempted: usize) {
    counter!("fastframe_dispatch_workers_finished_total").increment(1);
    gauge!(
        "fastframe_dispatch_worker_items",
        "worker" => worker.to_string()
    )
    .set(attempted as f64);
}

/// Dispatch metrics aggregator
///
/// Aggregates results in memory for run statistics and the summary report.
#[derive(Debug, Clone, Default)]
pub struct DispatchMetricsAggregator {
    /// Total items attempted
    pub total_items: u64,

    /// Total failures (nonzero exit, kill or launch error)
    pub total_failures: u64,

    /// Failures that were timeouts
    pub total_timeouts: u64,

    /// Items resolved as dry runs
    pub total_dry_runs: u64,

    /// Elapsed seconds across all attempts
    pub elapsed_stats: RunningStats,

    /// Elapsed seconds per flavor
    pub flavor_elapsed: std::collections::HashMap<String, RunningStats>,

    /// Failure counts per flavor
    pub flavor_failures: std::collections::HashMap<String, u64>,
}

impl DispatchMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result into the aggregate
    pub fn update(&mut self, result: &RunResult) {
        self.total_items += 1;
        let flavor = result.item.flavor.label().to_string();

        match &result.status {
            RunStatus::Succeeded => {}
            RunStatus::Failed { timed_out, .. } => {
                self.total_failures += 1;
                if *timed_out {
                    self.total_timeouts += 1;
                }
                *self.flavor_failures.entry(flavor.clone()).or_insert(0) += 1;
            }
            RunStatus::DryRun => self.total_dry_runs += 1,
        }

        let secs = result.elapsed.as_secs_f64();
        self.elapsed_stats.push(secs);
        self.flavor_elapsed.entry(flavor).or_default().push(secs);
    }

    /// Produce the summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_items: self.total_items,
            total_failures: self.total_failures,
            total_timeouts: self.total_timeouts,
            total_dry_runs: self.total_dry_runs,
            failure_rate: if self.total_items > 0 {
                self.total_failures as f64 / self.total_items as f64 * 100.0
            } else {
                0.0
            },
            elapsed_secs: StatsSummary::from(&self.elapsed_stats),
            flavor_failures: self.flavor_failures.clone(),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_items: u64,
    pub total_failures: u64,
    pub total_timeouts: u64,
    pub total_dry_runs: u64,
    pub failure_rate: f64,
    pub elapsed_secs: StatsSummary,
    pub flavor_failures: std::collections::HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Metrics Summary ===")?;
        writeln!(f, "Total items: {}", self.total_items)?;
        writeln!(
            f,
            "Failures: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;
        writeln!(f, "Timeouts: {}", self.total_timeouts)?;
        writeln!(f, "Dry runs: {}", self.total_dry_runs)?;
        writeln!(f, "Item duration (s): {}", self.elapsed_secs)?;

        if !self.flavor_failures.is_empty() {
            writeln!(f, "Failures by flavor:")?;
            for (flavor, count) in &self.flavor_failures {
                writeln!(f, "  {}: {}", flavor, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics accumulator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
