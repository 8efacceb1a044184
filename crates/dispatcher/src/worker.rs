//! Per-worker dispatch loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use contracts::{DataLayout, FastframeConfig, RunResult, RunStatus, WorkItem, WorkerId};
use runner::{FrameRunner, Invocation};

/// Everything a worker needs besides its identity and the work list.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub fastframe: FastframeConfig,
    pub layout: DataLayout,
    /// Per-item wall-clock limit, `None` = unlimited
    pub timeout: Option<Duration>,
    /// Log the command instead of launching it
    pub dry_run: bool,
}

/// Sequential dispatch loop over one worker's strided share of the list.
///
/// Failure isolation: nothing an individual item does stops the loop. A
/// failed launch, a nonzero exit or a timeout becomes a `Failed` result and
/// the loop moves on.
pub struct WorkerLoop<R> {
    worker: WorkerId,
    runner: Arc<R>,
    config: WorkerConfig,
}

impl<R: FrameRunner> WorkerLoop<R> {
    pub fn new(worker: WorkerId, runner: Arc<R>, config: WorkerConfig) -> Self {
        Self {
            worker,
            runner,
            config,
        }
    }

    /// Process this worker's share of `items` and return one result per
    /// attempted item.
    #[instrument(name = "worker_loop", skip(self, items), fields(worker = %self.worker))]
    pub async fn run(self, items: Arc<[WorkItem]>, size: usize) -> Vec<RunResult> {
        let mine = scheduler::assigned(&items, self.worker, size);
        info!(
            worker = %self.worker,
            assigned = mine.len(),
            total = items.len(),
            "worker starting"
        );

        let mut results = Vec::with_capacity(mine.len());
        for item in mine {
            results.push(self.attempt(item).await);
        }

        info!(
            worker = %self.worker,
            failures = results.iter().filter(|r| r.status.is_failure()).count(),
            "worker finished"
        );
        results
    }

    async fn attempt(&self, item: WorkItem) -> RunResult {
        let started = Instant::now();

        let invocation = match Invocation::build(&self.config.fastframe, &self.config.layout, &item)
        {
            Ok(invocation) => invocation,
            Err(e) => {
                error!(worker = %self.worker, item = %item, error = %e, "could not build invocation");
                return RunResult {
                    worker: self.worker,
                    item,
                    status: RunStatus::failed(None),
                    elapsed: started.elapsed(),
                };
            }
        };

        if self.config.dry_run {
            info!(
                worker = %self.worker,
                item = %item,
                command = %invocation.command_line(),
                "dry run"
            );
            return RunResult {
                worker: self.worker,
                item,
                status: RunStatus::DryRun,
                elapsed: started.elapsed(),
            };
        }

        info!(
            worker = %self.worker,
            item = %item,
            log = %invocation.log_path.display(),
            "dispatching"
        );

        let status = match self
            .runner
            .run(&item, &invocation, self.config.timeout)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                error!(worker = %self.worker, item = %item, error = %e, "launch failed");
                RunStatus::failed(None)
            }
        };

        let elapsed = started.elapsed();
        match &status {
            RunStatus::Succeeded => {
                info!(worker = %self.worker, item = %item, secs = elapsed.as_secs(), "item succeeded");
            }
            RunStatus::Failed {
                exit_code,
                timed_out,
            } => {
                error!(
                    worker = %self.worker,
                    item = %item,
                    exit_code = ?exit_code,
                    timed_out,
                    "item failed"
                );
            }
            RunStatus::DryRun => {}
        }

        RunResult {
            worker: self.worker,
            item,
            status,
            elapsed,
        }
    }
}
