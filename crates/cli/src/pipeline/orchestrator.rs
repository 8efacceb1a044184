//! Dispatch orchestrator - coordinates discovery, workers and aggregation.
//!
//! Explicit role split: the coordinator discovers and broadcasts the work
//! list, the workers consume their strided shares, and everyone meets at a
//! rendezvous before the summary is built. Workers never touch the
//! filesystem tree during discovery and the coordinator never runs items.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use contracts::{NightRange, PipelineError, RunBlueprint, RunResult, WorkItem, WorkerId};
use discovery::{Discovery, DiscoveryOptions};
use dispatcher::{RunSummary, WorkerConfig, WorkerLoop};
use observability::{record_item_result, record_worker_finished, DispatchMetricsAggregator};
use runner::{FrameRunner, SubprocessRunner};
use scheduler::{work_channel, Rendezvous};

use super::DispatchStats;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// The run blueprint, with CLI overrides already applied
    pub blueprint: RunBlueprint,

    /// Half-open night selection
    pub range: NightRange,

    /// Dispatch even when all outputs exist
    pub clobber: bool,

    /// Log commands instead of launching them
    pub dry_run: bool,

    /// Relocate outputs and logs under this directory
    pub outdir: Option<std::path::PathBuf>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main dispatch orchestrator
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Run the dispatch to completion with the real subprocess runner
    pub async fn run(self) -> Result<DispatchStats> {
        self.run_with_runner(Arc::new(SubprocessRunner::new()))
            .await
    }

    /// Run with an arbitrary runner implementation
    pub async fn run_with_runner<R>(self, runner: Arc<R>) -> Result<DispatchStats>
    where
        R: FrameRunner + 'static,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut layout = blueprint.layout();
        if let Some(ref outdir) = self.config.outdir {
            layout = layout.with_outdir(outdir);
        }

        // Coordinator role: discover once, freeze the list
        info!(raw_root = %layout.raw_root().display(), "Discovering exposures...");
        let items = Discovery::new(
            blueprint,
            layout.clone(),
            DiscoveryOptions {
                range: self.config.range.clone(),
                clobber: self.config.clobber,
            },
        )
        .discover()
        .context("Exposure discovery failed")?;

        let size = blueprint.dispatch.workers;
        let items: Arc<[WorkItem]> = items.into();

        info!(
            items = items.len(),
            workers = size,
            dry_run = self.config.dry_run,
            "Work list frozen"
        );

        if items.is_empty() {
            warn!("Nothing to dispatch");
        }

        let worker_config = WorkerConfig {
            fastframe: blueprint.fastframe.clone(),
            layout,
            timeout: blueprint.dispatch.item_timeout(),
            dry_run: self.config.dry_run,
        };

        // Worker role: receive the list, run the strided share, rendezvous
        let (broadcast, receivers) = work_channel(size);
        let rendezvous = Rendezvous::new(size);

        let mut handles = Vec::with_capacity(size);
        for receiver in receivers {
            let worker = receiver.worker();
            let runner = Arc::clone(&runner);
            let config = worker_config.clone();
            let rendezvous = rendezvous.clone();

            handles.push(tokio::spawn(async move {
                let result = run_worker(worker, receiver, runner, config, size).await;
                rendezvous.arrive().await;
                result
            }));
        }

        broadcast.broadcast(Arc::clone(&items));

        // Full stop: aggregation starts only after every worker is done
        rendezvous.arrive().await;
        info!("All workers reached the rendezvous");

        let mut results: Vec<RunResult> = Vec::with_capacity(items.len());
        for handle in handles {
            let worker_results = handle.await.context("Worker task panicked")??;
            results.extend(worker_results);
        }

        Ok(self.aggregate(items.len(), size, results, start_time))
    }

    /// Coordinator role again: fold results into the final report.
    fn aggregate(
        &self,
        discovered: usize,
        workers: usize,
        results: Vec<RunResult>,
        start_time: Instant,
    ) -> DispatchStats {
        let mut run_metrics = DispatchMetricsAggregator::new();
        for result in &results {
            record_item_result(result);
            run_metrics.update(result);
        }
        for w in 0..workers {
            let attempted = results.iter().filter(|r| r.worker == WorkerId(w)).count();
            record_worker_finished(w, attempted);
        }

        let duration = start_time.elapsed();
        let summary = RunSummary::from_results(&results, duration);

        DispatchStats {
            discovered,
            workers,
            duration,
            summary,
            run_metrics,
        }
    }
}

/// One worker task: wait for the broadcast, run the loop.
async fn run_worker<R: FrameRunner>(
    worker: WorkerId,
    receiver: scheduler::WorkReceiver,
    runner: Arc<R>,
    config: WorkerConfig,
    size: usize,
) -> Result<Vec<RunResult>, PipelineError> {
    let items = receiver.recv().await?;
    let results = WorkerLoop::new(worker, runner, config).run(items, size).await;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ExpId, Flavor, Night, PathsConfig};
    use runner::{MockConfig, MockRunner};
    use tempfile::TempDir;

    fn blueprint(raw: &TempDir, prod: &TempDir, workers: usize) -> RunBlueprint {
        let mut bp = RunBlueprint {
            version: Default::default(),
            paths: PathsConfig {
                raw_root: raw.path().to_path_buf(),
                prod_root: prod.path().to_path_buf(),
            },
            fastframe: Default::default(),
            instrument: Default::default(),
            selection: Default::default(),
            dispatch: Default::default(),
        };
        bp.dispatch.workers = workers;
        bp
    }

    fn seed(raw: &TempDir, night: &str, expid: u32, flavor: Flavor) {
        let night = Night::parse(night).unwrap();
        let path = contracts::DataLayout::new(raw.path(), "/unused")
            .simspec_path(&night, ExpId(expid));
        discovery::write_stub(&path, &flavor, ExpId(expid)).unwrap();
    }

    fn config(bp: RunBlueprint) -> OrchestratorConfig {
        OrchestratorConfig {
            blueprint: bp,
            range: NightRange::unbounded(),
            clobber: false,
            dry_run: false,
            outdir: None,
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn dispatches_every_discovered_item_once() {
        let raw = TempDir::new().unwrap();
        let prod = TempDir::new().unwrap();
        seed(&raw, "20200101", 1, Flavor::Flat);
        seed(&raw, "20200101", 2, Flavor::Science);
        seed(&raw, "20200102", 3, Flavor::Science);

        let runner = Arc::new(MockRunner::new());
        let stats = Orchestrator::new(config(blueprint(&raw, &prod, 2)))
            .run_with_runner(Arc::clone(&runner))
            .await
            .unwrap();

        assert_eq!(stats.discovered, 3);
        assert_eq!(runner.run_count(), 3);
        assert!(!stats.has_failures());
    }

    #[tokio::test]
    async fn failures_are_isolated_and_counted() {
        let raw = TempDir::new().unwrap();
        let prod = TempDir::new().unwrap();
        seed(&raw, "20200101", 1, Flavor::Science);
        seed(&raw, "20200101", 2, Flavor::Science);

        let runner = Arc::new(MockRunner::with_config(MockConfig {
            fail_expids: vec![ExpId(1)],
            ..Default::default()
        }));

        let stats = Orchestrator::new(config(blueprint(&raw, &prod, 1)))
            .run_with_runner(Arc::clone(&runner))
            .await
            .unwrap();

        assert_eq!(stats.summary.failed, 1);
        assert_eq!(runner.run_count(), 2);
    }

    #[tokio::test]
    async fn empty_tree_is_a_clean_run() {
        let raw = TempDir::new().unwrap();
        let prod = TempDir::new().unwrap();

        let runner = Arc::new(MockRunner::new());
        let stats = Orchestrator::new(config(blueprint(&raw, &prod, 4)))
            .run_with_runner(runner)
            .await
            .unwrap();

        assert_eq!(stats.discovered, 0);
        assert!(!stats.has_failures());
    }
}
