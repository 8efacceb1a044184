//! Simulator runner abstraction.
//!
//! Defines the trait the dispatch loop drives, with a real subprocess
//! implementation and a mock for testing.

use std::future::Future;
use std::time::Duration;

use contracts::{PipelineError, RunStatus, WorkItem};

use crate::invocation::Invocation;

/// Executes one simulator invocation per work item.
///
/// Unified interface for the real subprocess runner and the mock; the
/// dispatch loop is generic over it so worker behavior is testable without
/// spawning processes.
pub trait FrameRunner: Send + Sync {
    /// Run the invocation for `item` to completion.
    ///
    /// A nonzero exit, a kill, or a timeout is a `RunStatus::Failed`, not an
    /// `Err`; `Err` is reserved for attempts that could not be launched or
    /// observed at all.
    fn run(
        &self,
        item: &WorkItem,
        invocation: &Invocation,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<RunStatus, PipelineError>> + Send;
}
