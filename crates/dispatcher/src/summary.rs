//! End-of-run aggregation.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use contracts::{RunResult, RunStatus};

/// Attempt counts for one flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorCounts {
    pub succeeded: usize,
    pub failed: usize,
    pub dry_run: usize,
}

impl FlavorCounts {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.dry_run
    }
}

/// Aggregated view of one complete run, built on the coordinator after the
/// final rendezvous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Counts keyed by flavor label; BTreeMap keeps report order stable
    pub by_flavor: BTreeMap<String, FlavorCounts>,
    pub total: usize,
    pub failed: usize,
    /// Wall-clock time of the whole run, discovery through rendezvous
    pub wall: Duration,
}

impl RunSummary {
    /// Fold per-worker results into the final summary.
    pub fn from_results(results: &[RunResult], wall: Duration) -> Self {
        let mut by_flavor: BTreeMap<String, FlavorCounts> = BTreeMap::new();
        let mut failed = 0;

        for result in results {
            let counts = by_flavor
                .entry(result.item.flavor.label().to_string())
                .or_default();
            match result.status {
                RunStatus::Succeeded => counts.succeeded += 1,
                RunStatus::Failed { .. } => {
                    counts.failed += 1;
                    failed += 1;
                }
                RunStatus::DryRun => counts.dry_run += 1,
            }
        }

        Self {
            by_flavor,
            total: results.len(),
            failed,
            wall,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Wall-clock time in minutes, the unit operators reason in.
    pub fn wall_minutes(&self) -> f64 {
        self.wall.as_secs_f64() / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ExpId, Flavor, Night, WorkItem, WorkerId};
    use std::path::PathBuf;

    fn result(expid: u32, flavor: Flavor, status: RunStatus) -> RunResult {
        RunResult {
            worker: WorkerId(0),
            item: WorkItem {
                night: Night::parse("20200101").unwrap(),
                expid: ExpId(expid),
                flavor,
                simspec: PathBuf::from("/raw/x/simspec.fits"),
            },
            status,
            elapsed: Duration::from_secs(1),
        }
    }

    #[test]
    fn counts_group_by_flavor() {
        let results = vec![
            result(1, Flavor::Flat, RunStatus::Succeeded),
            result(2, Flavor::Flat, RunStatus::failed(Some(1))),
            result(3, Flavor::Science, RunStatus::Succeeded),
            result(4, Flavor::Science, RunStatus::Succeeded),
        ];

        let summary = RunSummary::from_results(&results, Duration::from_secs(120));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert_eq!(summary.by_flavor["flat"].succeeded, 1);
        assert_eq!(summary.by_flavor["flat"].failed, 1);
        assert_eq!(summary.by_flavor["science"].succeeded, 2);
        assert_eq!(summary.wall_minutes(), 2.0);
    }

    #[test]
    fn empty_run_has_no_failures() {
        let summary = RunSummary::from_results(&[], Duration::from_secs(1));
        assert_eq!(summary.total, 0);
        assert!(!summary.has_failures());
        assert!(summary.by_flavor.is_empty());
    }

    #[test]
    fn dry_runs_are_not_failures() {
        let results = vec![result(1, Flavor::Flat, RunStatus::DryRun)];
        let summary = RunSummary::from_results(&results, Duration::ZERO);
        assert!(!summary.has_failures());
        assert_eq!(summary.by_flavor["flat"].dry_run, 1);
    }
}
