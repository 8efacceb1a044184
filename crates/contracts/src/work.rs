//! Work items and per-attempt results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::{ExpId, Flavor, Night};

/// One unit of work: a single simspec input exposure.
///
/// Immutable once discovered. The coordinator computes the full sorted list
/// exactly once; workers never re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub night: Night,
    pub expid: ExpId,
    pub flavor: Flavor,
    /// Absolute path of the simspec input file
    pub simspec: PathBuf,
}

impl WorkItem {
    /// Sort key: flavor first so same-cost items cluster per worker,
    /// then night/expid for a stable total order.
    pub fn sort_key(&self) -> (Flavor, Night, ExpId) {
        (self.flavor.clone(), self.night.clone(), self.expid)
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({})",
            self.night,
            self.expid.padded(),
            self.flavor
        )
    }
}

/// Identifies one of `size` cooperating workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunStatus {
    /// Child exited 0
    Succeeded,
    /// Child exited nonzero, was killed, or the attempt never launched
    Failed {
        exit_code: Option<i32>,
        timed_out: bool,
    },
    /// Command constructed and logged, invocation skipped
    DryRun,
}

impl RunStatus {
    pub fn failed(exit_code: Option<i32>) -> Self {
        Self::Failed {
            exit_code,
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self::Failed {
            exit_code: None,
            timed_out: true,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Failed { .. })
    }
}

/// Ephemeral record of one attempt, consumed only for logging/aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub worker: WorkerId,
    pub item: WorkItem,
    pub status: RunStatus,
    pub elapsed: Duration,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, RunStatus::Succeeded)
    }
}
