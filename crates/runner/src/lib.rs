//! # Runner
//!
//! Execution of the external simulator, one child process per work item.
//!
//! Responsibilities:
//! - Build the per-item command line and log path
//! - Spawn the child with output redirected into the log file
//! - Enforce the optional per-item wall-clock limit
//! - Translate exit status into a `RunStatus`

mod invocation;
mod mock_runner;
mod runner;
mod subprocess;

pub use invocation::Invocation;
pub use mock_runner::{MockConfig, MockRunner, RecordedRun};
pub use runner::FrameRunner;
pub use subprocess::SubprocessRunner;
