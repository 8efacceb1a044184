//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Responsibilities:
//! - Contract smoke tests
//! - Mock e2e dispatch runs (no external simulator required)
//! - Full-flow checks: discovery, broadcast, partition, summary

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        Channel, DataLayout, ExpId, Flavor, FrameFormat, Night, NightRange, RunBlueprint,
        RunResult, WorkItem,
    };
    use discovery::DiscoveryOptions;
    use dispatcher::{RunSummary, WorkerConfig, WorkerLoop};
    use observability::DispatchMetricsAggregator;
    use runner::{FrameRunner, MockConfig, MockRunner};
    use scheduler::{work_channel, Rendezvous};
    use tempfile::TempDir;

    /// Synthetic raw/prod tree plus a blueprint pointing at it.
    struct Fixture {
        raw: TempDir,
        _prod: TempDir,
        blueprint: RunBlueprint,
    }

    impl Fixture {
        fn new(workers: usize) -> Self {
            let raw = TempDir::new().unwrap();
            let prod = TempDir::new().unwrap();

            // Loading through the config layer keeps the fixture honest
            let toml = format!(
                r#"
[paths]
raw_root = "{}"
prod_root = "{}"

[instrument]
channels = ["b", "r"]
spectrographs = 2

[dispatch]
workers = {}
"#,
                raw.path().display(),
                prod.path().display(),
                workers
            );
            let blueprint = config_loader::ConfigLoader::load_from_str(
                &toml,
                config_loader::ConfigFormat::Toml,
            )
            .unwrap();

            Self {
                raw,
                _prod: prod,
                blueprint,
            }
        }

        fn layout(&self) -> DataLayout {
            self.blueprint.layout()
        }

        fn seed(&self, night: &str, expid: u32, flavor: Flavor) {
            let night = Night::parse(night).unwrap();
            let path = self.layout().simspec_path(&night, ExpId(expid));
            discovery::write_stub(&path, &flavor, ExpId(expid)).unwrap();
        }

        fn seed_outputs(&self, night: &str, expid: u32, count: usize) {
            let night = Night::parse(night).unwrap();
            let item = WorkItem {
                night: night.clone(),
                expid: ExpId(expid),
                flavor: Flavor::Science,
                simspec: self.layout().simspec_path(&night, ExpId(expid)),
            };
            let cameras = self.blueprint.cameras();
            let outputs = self
                .layout()
                .expected_outputs(FrameFormat::Frame, &cameras, &item);
            for path in outputs.iter().take(count) {
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, b"").unwrap();
            }
        }
    }

    /// Drive the full flow: discover, broadcast, strided worker loops,
    /// rendezvous, collect. Mirrors the orchestrator without the CLI.
    async fn run_full_flow<R: FrameRunner + 'static>(
        fx: &Fixture,
        layout: DataLayout,
        options: DiscoveryOptions,
        dry_run: bool,
        runner: Arc<R>,
    ) -> (Vec<WorkItem>, Vec<RunResult>) {
        let items = discovery::discover(&fx.blueprint, layout.clone(), options).unwrap();
        let list: Arc<[WorkItem]> = items.clone().into();
        let size = fx.blueprint.dispatch.workers;

        let config = WorkerConfig {
            fastframe: fx.blueprint.fastframe.clone(),
            layout,
            timeout: fx.blueprint.dispatch.item_timeout(),
            dry_run,
        };

        let (broadcast, receivers) = work_channel(size);
        let rendezvous = Rendezvous::new(size);

        let mut handles = Vec::new();
        for receiver in receivers {
            let worker = receiver.worker();
            let runner = Arc::clone(&runner);
            let config = config.clone();
            let rendezvous = rendezvous.clone();

            handles.push(tokio::spawn(async move {
                let items = receiver.recv().await.unwrap();
                let results = WorkerLoop::new(worker, runner, config).run(items, size).await;
                rendezvous.arrive().await;
                results
            }));
        }

        broadcast.broadcast(Arc::clone(&list));
        rendezvous.arrive().await;

        let mut results = Vec::new();
        for handle in handles {
            results.extend(handle.await.unwrap());
        }
        (items, results)
    }

    /// Every discovered item is attempted exactly once, regardless of how
    /// the list splits across workers.
    #[tokio::test]
    async fn test_e2e_partition_is_exhaustive() {
        let fx = Fixture::new(3);
        for expid in 1..=7 {
            fx.seed("20200101", expid, Flavor::Science);
        }

        let runner = Arc::new(MockRunner::new());
        let (items, results) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;

        assert_eq!(items.len(), 7);
        assert_eq!(results.len(), 7);

        let attempted: HashSet<ExpId> = results.iter().map(|r| r.item.expid).collect();
        let discovered: HashSet<ExpId> = items.iter().map(|i| i.expid).collect();
        assert_eq!(attempted, discovered);
        assert_eq!(runner.run_count(), 7);
    }

    /// A completed exposure is skipped until clobber brings it back.
    #[tokio::test]
    async fn test_e2e_skip_if_complete() {
        let fx = Fixture::new(1);
        fx.seed("20200101", 1, Flavor::Science);
        fx.seed("20200101", 2, Flavor::Science);
        fx.seed_outputs("20200101", 1, 4); // all 4 cameras of the fixture

        let runner = Arc::new(MockRunner::new());
        let (items, _) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].expid, ExpId(2));

        let (items, _) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions {
                clobber: true,
                ..Default::default()
            },
            false,
            runner,
        )
        .await;
        assert_eq!(items.len(), 2);
    }

    /// An exposure with some but not all outputs is dispatched again.
    #[tokio::test]
    async fn test_e2e_partial_outputs_retried() {
        let fx = Fixture::new(1);
        fx.seed("20200101", 1, Flavor::Science);
        fx.seed_outputs("20200101", 1, 3);

        let runner = Arc::new(MockRunner::new());
        let (items, _) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            runner,
        )
        .await;

        assert_eq!(items.len(), 1);
    }

    /// One failing item neither stops its worker nor leaks into other
    /// items' outcomes.
    #[tokio::test]
    async fn test_e2e_failure_isolation() {
        let fx = Fixture::new(1);
        fx.seed("20200101", 1, Flavor::Flat);
        fx.seed("20200101", 2, Flavor::Science);
        fx.seed("20200102", 3, Flavor::Science);

        let runner = Arc::new(MockRunner::with_config(MockConfig {
            fail_expids: vec![ExpId(2)],
            ..Default::default()
        }));

        let (_, results) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;

        assert_eq!(runner.run_count(), 3);
        let summary = RunSummary::from_results(&results, Duration::from_secs(60));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.by_flavor["flat"].succeeded, 1);
        assert_eq!(summary.by_flavor["science"].failed, 1);
        assert_eq!(summary.by_flavor["science"].succeeded, 1);

        // The metrics aggregator sees the same outcomes
        let mut run_metrics = DispatchMetricsAggregator::new();
        for result in &results {
            run_metrics.update(result);
        }
        assert_eq!(run_metrics.total_items, 3);
        assert_eq!(run_metrics.total_failures, 1);
        assert_eq!(run_metrics.flavor_failures["science"], 1);
    }

    /// Dry-run resolves commands without launching anything.
    #[tokio::test]
    async fn test_e2e_dry_run() {
        let fx = Fixture::new(2);
        fx.seed("20200101", 1, Flavor::Science);
        fx.seed("20200101", 2, Flavor::Flat);

        let runner = Arc::new(MockRunner::new());
        let (items, results) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            true,
            Arc::clone(&runner),
        )
        .await;

        assert_eq!(items.len(), 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.status.is_failure()));
        assert_eq!(runner.run_count(), 0);
    }

    /// Half-open night range, per the standard processing convention.
    #[tokio::test]
    async fn test_e2e_night_range() {
        let fx = Fixture::new(1);
        fx.seed("20191231", 1, Flavor::Science);
        fx.seed("20200101", 2, Flavor::Science);
        fx.seed("20200102", 3, Flavor::Science);
        fx.seed("20200103", 4, Flavor::Science);

        let runner = Arc::new(MockRunner::new());
        let options = DiscoveryOptions {
            range: NightRange::from_bounds(Some("20200101"), Some("20200103")).unwrap(),
            clobber: false,
        };
        let (items, _) = run_full_flow(&fx, fx.layout(), options, false, runner).await;

        let nights: Vec<&str> = items.iter().map(|i| i.night.as_str()).collect();
        assert_eq!(nights, vec!["20200101", "20200102"]);
    }

    /// The configured per-item limit reaches the runner.
    #[tokio::test]
    async fn test_e2e_timeout_propagation() {
        let mut fx = Fixture::new(1);
        fx.blueprint.dispatch.item_timeout_secs = 90;
        fx.seed("20200101", 1, Flavor::Science);

        let runner = Arc::new(MockRunner::new());
        run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;

        let runs = runner.recorded_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].timeout, Some(Duration::from_secs(90)));
    }

    /// Timed-out items surface as failures in the summary.
    #[tokio::test]
    async fn test_e2e_timeout_counts_as_failure() {
        let fx = Fixture::new(1);
        fx.seed("20200101", 1, Flavor::Science);

        let runner = Arc::new(MockRunner::with_config(MockConfig {
            timeout_expids: vec![ExpId(1)],
            ..Default::default()
        }));

        let (_, results) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            runner,
        )
        .await;

        let summary = RunSummary::from_results(&results, Duration::from_secs(10));
        assert_eq!(summary.failed, 1);

        let mut run_metrics = DispatchMetricsAggregator::new();
        for result in &results {
            run_metrics.update(result);
        }
        assert_eq!(run_metrics.total_failures, 1);
        assert_eq!(run_metrics.total_timeouts, 1);
    }

    /// With an outdir override, commands carry it and completeness is
    /// checked against it.
    #[tokio::test]
    async fn test_e2e_outdir_override() {
        let fx = Fixture::new(1);
        fx.seed("20200101", 1, Flavor::Science);

        let outdir = TempDir::new().unwrap();
        let layout = fx.layout().with_outdir(outdir.path());

        let runner = Arc::new(MockRunner::new());
        run_full_flow(
            &fx,
            layout,
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;

        let runs = runner.recorded_runs();
        assert_eq!(runs.len(), 1);
        assert!(runs[0]
            .command_line
            .contains(&format!("--outdir {}", outdir.path().display())));
    }

    /// Non-whitelisted flavors never reach a worker.
    #[tokio::test]
    async fn test_e2e_flavor_whitelist() {
        let fx = Fixture::new(2);
        fx.seed("20200101", 1, Flavor::Arc);
        fx.seed("20200101", 2, Flavor::Dark);
        fx.seed("20200101", 3, Flavor::Flat);
        fx.seed("20200101", 4, Flavor::Science);
        fx.seed("20200101", 5, Flavor::Other("twilight".into()));

        let runner = Arc::new(MockRunner::new());
        let (items, _) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;

        let expids: HashSet<u32> = items.iter().map(|i| i.expid.0).collect();
        assert_eq!(expids, HashSet::from([3, 4]));
        assert_eq!(runner.run_count(), 2);
    }

    /// Two runs over the same unchanged tree dispatch the same list in the
    /// same order.
    #[tokio::test]
    async fn test_e2e_determinism() {
        let fx = Fixture::new(2);
        fx.seed("20200102", 4, Flavor::Science);
        fx.seed("20200101", 2, Flavor::Flat);
        fx.seed("20200101", 1, Flavor::Science);

        let first = discovery::discover(
            &fx.blueprint,
            fx.layout(),
            DiscoveryOptions::default(),
        )
        .unwrap();
        let second = discovery::discover(
            &fx.blueprint,
            fx.layout(),
            DiscoveryOptions::default(),
        )
        .unwrap();

        assert_eq!(first, second);
        // Flavor-major order: the flat comes first
        assert_eq!(first[0].flavor, Flavor::Flat);
    }

    /// Instrument geometry drives the completeness test: enlarging the
    /// camera set makes a previously-complete exposure eligible again.
    #[tokio::test]
    async fn test_e2e_geometry_affects_completeness() {
        let mut fx = Fixture::new(1);
        fx.seed("20200101", 1, Flavor::Science);
        fx.seed_outputs("20200101", 1, 4);

        let runner = Arc::new(MockRunner::new());
        let (items, _) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            Arc::clone(&runner),
        )
        .await;
        assert!(items.is_empty());

        // Add the z channel; existing outputs no longer cover the set
        fx.blueprint.instrument.channels = vec![Channel::B, Channel::R, Channel::Z];
        let (items, _) = run_full_flow(
            &fx,
            fx.layout(),
            DiscoveryOptions::default(),
            false,
            runner,
        )
        .await;
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_raw_tree_shape() {
        let fx = Fixture::new(1);
        fx.seed("20200101", 42, Flavor::Science);

        let expected = fx
            .raw
            .path()
            .join("20200101/00000042/simspec-00000042.fits");
        assert!(expected.is_file());
    }
}
