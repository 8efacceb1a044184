//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use contracts::NightRange;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Orchestrator, OrchestratorConfig};

/// Execute the `run` command
pub async fn run_dispatch(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    // Load and parse the blueprint
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be >= 1");
        }
        info!(workers, "Overriding worker count from CLI");
        blueprint.dispatch.workers = workers;
    }
    if args.cframe {
        info!("Expecting cframe outputs");
        blueprint.fastframe.format = contracts::FrameFormat::CFrame;
    }
    if args.strict {
        blueprint.dispatch.strict = true;
    }
    if let Some(secs) = args.item_timeout {
        info!(secs, "Overriding per-item timeout from CLI");
        blueprint.dispatch.item_timeout_secs = secs;
    }

    let range = NightRange::from_bounds(args.start.as_deref(), args.stop.as_deref())
        .context("Invalid --start/--stop night")?;

    info!(
        raw_root = %blueprint.paths.raw_root.display(),
        prod_root = %blueprint.paths.prod_root.display(),
        workers = blueprint.dispatch.workers,
        flavors = ?blueprint.selection.flavors,
        start = ?range.start,
        stop = ?range.stop,
        "Blueprint loaded"
    );

    let strict = blueprint.dispatch.strict;
    let orchestrator_config = OrchestratorConfig {
        blueprint,
        range,
        clobber: args.clobber,
        dry_run: args.dry_run,
        outdir: args.outdir.clone(),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let orchestrator = Orchestrator::new(orchestrator_config);

    info!("Starting dispatch...");

    // Runs to completion; interrupting mid-run is not supported beyond the
    // per-item timeout, so every started child is waited for and reported.
    let stats = orchestrator.run().await.context("Dispatch execution failed")?;

    info!(
        items = stats.discovered,
        failed = stats.summary.failed,
        minutes = format!("{:.1}", stats.summary.wall_minutes()),
        "Dispatch completed"
    );

    // Print detailed statistics
    stats.print_summary();

    if strict && stats.has_failures() {
        return Err(CliError::StrictFailures {
            failed: stats.summary.failed,
            total: stats.summary.total,
        }
        .into());
    }
    if stats.has_failures() {
        warn!(
            failed = stats.summary.failed,
            "Some items failed; their exposures will be retried on the next run"
        );
    }

    info!("Fastframe Dispatch finished");
    Ok(())
}
