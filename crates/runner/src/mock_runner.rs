//! Mock runner for tests: scripted outcomes, no processes spawned.

use std::sync::Mutex;
use std::time::Duration;

use contracts::{ExpId, PipelineError, RunStatus, WorkItem};
use tracing::instrument;

use crate::invocation::Invocation;
use crate::runner::FrameRunner;

/// Failure scenarios the mock should act out.
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Items that should exit nonzero
    pub fail_expids: Vec<ExpId>,
    /// Items that should report a timeout
    pub timeout_expids: Vec<ExpId>,
    /// Items whose launch should error outright
    pub spawn_error_expids: Vec<ExpId>,
}

/// Record of one mock attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub expid: ExpId,
    pub command_line: String,
    pub timeout: Option<Duration>,
}

/// In-memory runner that records every attempt and answers from its config.
#[derive(Debug, Default)]
pub struct MockRunner {
    config: MockConfig,
    runs: Mutex<Vec<RecordedRun>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }
}

impl FrameRunner for MockRunner {
    #[instrument(name = "mock_run", skip(self, invocation), fields(item = %item))]
    async fn run(
        &self,
        item: &WorkItem,
        invocation: &Invocation,
        timeout: Option<Duration>,
    ) -> Result<RunStatus, PipelineError> {
        self.runs.lock().unwrap().push(RecordedRun {
            expid: item.expid,
            command_line: invocation.command_line(),
            timeout,
        });

        if self.config.spawn_error_expids.contains(&item.expid) {
            return Err(PipelineError::Spawn {
                program: invocation.program.clone(),
                message: "mock spawn failure".into(),
            });
        }
        if self.config.timeout_expids.contains(&item.expid) {
            return Ok(RunStatus::timed_out());
        }
        if self.config.fail_expids.contains(&item.expid) {
            return Ok(RunStatus::failed(Some(1)));
        }
        Ok(RunStatus::Succeeded)
    }
}
