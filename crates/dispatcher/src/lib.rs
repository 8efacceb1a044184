//! # Dispatcher
//!
//! Per-worker dispatch loops and end-of-run aggregation.
//!
//! Responsibilities:
//! - Drive one sequential loop per worker over its strided share
//! - Isolate item failures so one bad exposure never stalls a worker
//! - Fold per-worker results into the final run summary

pub mod summary;
pub mod worker;

pub use summary::{FlavorCounts, RunSummary};
pub use worker::{WorkerConfig, WorkerLoop};
