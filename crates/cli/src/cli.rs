//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fastframe Dispatch - batch dispatcher for simulated exposures
#[derive(Parser, Debug)]
#[command(
    name = "fastframe-dispatch",
    author,
    version,
    about = "Parallel dispatcher for fastframe exposure simulation",
    long_about = "Discovers simulated exposures in a raw night/expid tree, partitions \n\
                  them across cooperating workers, and runs one external fastframe \n\
                  process per exposure with per-item logging and failure isolation."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FASTFRAME_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FASTFRAME_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover and dispatch exposures
    Run(RunArgs),

    /// Validate a blueprint file without running
    Validate(ValidateArgs),

    /// Display blueprint information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to blueprint file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "dispatch.toml",
        env = "FASTFRAME_DISPATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Relocate outputs and logs under this directory
    #[arg(long, env = "FASTFRAME_DISPATCH_OUTDIR")]
    pub outdir: Option<PathBuf>,

    /// Dispatch exposures even when all their outputs already exist
    #[arg(long)]
    pub clobber: bool,

    /// Log each command instead of launching it
    #[arg(long)]
    pub dry_run: bool,

    /// Override worker count from the blueprint
    #[arg(long, env = "FASTFRAME_DISPATCH_WORKERS")]
    pub workers: Option<usize>,

    /// First night to consider, inclusive (YYYYMMDD)
    #[arg(long, env = "FASTFRAME_DISPATCH_START")]
    pub start: Option<String>,

    /// First night to exclude (YYYYMMDD)
    #[arg(long, env = "FASTFRAME_DISPATCH_STOP")]
    pub stop: Option<String>,

    /// Expect cframe outputs instead of frame outputs
    #[arg(long)]
    pub cframe: bool,

    /// Exit nonzero when any item fails
    #[arg(long)]
    pub strict: bool,

    /// Per-item wall-clock limit in seconds, overrides the blueprint (0 = unlimited)
    #[arg(long, env = "FASTFRAME_DISPATCH_ITEM_TIMEOUT")]
    pub item_timeout: Option<u64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FASTFRAME_DISPATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to blueprint file to validate
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to blueprint file
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every camera of the configured instrument
    #[arg(long)]
    pub cameras: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
