//! Real subprocess runner.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{instrument, warn};

use contracts::{PipelineError, RunStatus, WorkItem};

use crate::invocation::Invocation;
use crate::runner::FrameRunner;

/// Spawns one external simulator process per item, with stdout and stderr
/// redirected into the item's log file.
#[derive(Debug, Default, Clone)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Open (create or truncate) the log file and hand out two handles,
    /// one per stream.
    fn open_log(invocation: &Invocation) -> Result<(std::fs::File, std::fs::File), PipelineError> {
        if let Some(parent) = invocation.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stdout = std::fs::File::create(&invocation.log_path)?;
        let stderr = stdout.try_clone()?;
        Ok((stdout, stderr))
    }
}

impl FrameRunner for SubprocessRunner {
    #[instrument(
        name = "subprocess_run",
        skip(self, invocation),
        fields(item = %item, program = %invocation.program)
    )]
    async fn run(
        &self,
        item: &WorkItem,
        invocation: &Invocation,
        timeout: Option<Duration>,
    ) -> Result<RunStatus, PipelineError> {
        let (stdout, stderr) = Self::open_log(invocation)?;

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| PipelineError::Spawn {
                program: invocation.program.clone(),
                message: e.to_string(),
            })?;

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    warn!(item = %item, limit_secs = limit.as_secs(), "item timed out, killing child");
                    child.start_kill().map_err(|e| PipelineError::Spawn {
                        program: invocation.program.clone(),
                        message: format!("kill after timeout failed: {e}"),
                    })?;
                    // Reap the killed child so it doesn't linger
                    let _ = child.wait().await;
                    return Ok(RunStatus::timed_out());
                }
            },
            None => child.wait().await?,
        };

        if status.success() {
            Ok(RunStatus::Succeeded)
        } else {
            Ok(RunStatus::failed(status.code()))
        }
    }
}
