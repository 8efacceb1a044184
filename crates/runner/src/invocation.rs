//! Child process command construction.

use std::path::PathBuf;

use contracts::{DataLayout, FastframeConfig, FrameFormat, PipelineError, WorkItem};

/// One fully-resolved simulator invocation: program, arguments and the log
/// file its combined output is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub log_path: PathBuf,
}

impl Invocation {
    /// Resolve the command for one work item.
    pub fn build(
        config: &FastframeConfig,
        layout: &DataLayout,
        item: &WorkItem,
    ) -> Result<Self, PipelineError> {
        let log_path = layout.log_path(item)?;

        let mut args = vec![
            "--simspec".to_string(),
            item.simspec.display().to_string(),
        ];
        if let Some(outdir) = layout.outdir() {
            args.push("--outdir".to_string());
            args.push(outdir.display().to_string());
        }
        if config.format == FrameFormat::CFrame {
            args.push("--dataformat".to_string());
            args.push("cframe".to_string());
        }
        args.extend(config.extra_args.iter().cloned());

        Ok(Self {
            program: config.program.clone(),
            args,
            log_path,
        })
    }

    /// Shell-style rendering for logs and dry runs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
