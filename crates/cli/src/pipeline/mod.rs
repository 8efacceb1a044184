//! Dispatch orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use stats::DispatchStats;
