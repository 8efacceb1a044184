//! On-disk layout resolution.
//!
//! Input convention:  `{raw_root}/{night}/{expid:08}/simspec-{expid:08}.fits`
//! Output convention: `{prod_root}/exposures/{night}/{expid:08}/{prefix}-{cam}-{expid:08}.fits`
//!
//! This crate only *names* paths; existence checks and writes belong to the
//! callers. Output artifact paths are existence-tested during discovery and
//! never written by this pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Camera, ExpId, Night, PipelineError, WorkItem};

/// Output artifact family produced by the external simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// Uncalibrated frames (`frame-*.fits`)
    #[default]
    Frame,
    /// Calibrated frames (`cframe-*.fits`)
    CFrame,
}

impl FrameFormat {
    /// File name prefix of the artifact family
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameFormat::Frame => "frame",
            FrameFormat::CFrame => "cframe",
        }
    }
}

/// Resolves every path the dispatcher consumes or derives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    raw_root: PathBuf,
    prod_root: PathBuf,
    /// When set, logs are relocated beneath this directory instead of
    /// being placed next to their input files.
    outdir: Option<PathBuf>,
}

impl DataLayout {
    pub fn new(raw_root: impl Into<PathBuf>, prod_root: impl Into<PathBuf>) -> Self {
        Self {
            raw_root: raw_root.into(),
            prod_root: prod_root.into(),
            outdir: None,
        }
    }

    /// Relocate derived log files (and downstream outputs) under `outdir`
    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    pub fn raw_root(&self) -> &Path {
        &self.raw_root
    }

    pub fn outdir(&self) -> Option<&Path> {
        self.outdir.as_deref()
    }

    /// Directory holding one night of raw exposures
    pub fn night_dir(&self, night: &Night) -> PathBuf {
        self.raw_root.join(night.as_str())
    }

    /// Directory holding one raw exposure
    pub fn exposure_dir(&self, night: &Night, expid: ExpId) -> PathBuf {
        self.night_dir(night).join(expid.padded())
    }

    /// The simspec input file for one exposure
    pub fn simspec_path(&self, night: &Night, expid: ExpId) -> PathBuf {
        self.exposure_dir(night, expid)
            .join(format!("simspec-{}.fits", expid.padded()))
    }

    /// One expected output artifact. The effective production root is the
    /// outdir override when present.
    pub fn frame_path(
        &self,
        format: FrameFormat,
        camera: Camera,
        night: &Night,
        expid: ExpId,
    ) -> PathBuf {
        let root = self.outdir.as_deref().unwrap_or(&self.prod_root);
        root.join("exposures")
            .join(night.as_str())
            .join(expid.padded())
            .join(format!(
                "{}-{}-{}.fits",
                format.prefix(),
                camera,
                expid.padded()
            ))
    }

    /// The full deterministic set of expected outputs for one item.
    pub fn expected_outputs(
        &self,
        format: FrameFormat,
        cameras: &[Camera],
        item: &WorkItem,
    ) -> Vec<PathBuf> {
        cameras
            .iter()
            .map(|&camera| self.frame_path(format, camera, &item.night, item.expid))
            .collect()
    }

    /// Derive the per-item log path from the input path: `simspec` becomes
    /// `fastframe` and the extension becomes `.log`. With an outdir set the
    /// log is relocated beneath it, preserving the night/expid structure
    /// relative to the raw root.
    pub fn log_path(&self, item: &WorkItem) -> Result<PathBuf, PipelineError> {
        let file_name = item
            .simspec
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PipelineError::log_path(item.simspec.display().to_string(), "no file name")
            })?;

        if !file_name.contains("simspec") {
            return Err(PipelineError::log_path(
                item.simspec.display().to_string(),
                "file name does not contain 'simspec'",
            ));
        }

        let log_name = {
            let renamed = file_name.replace("simspec", "fastframe");
            match renamed.strip_suffix(".fits") {
                Some(stem) => format!("{stem}.log"),
                None => format!("{renamed}.log"),
            }
        };

        let parent = match &self.outdir {
            Some(outdir) => {
                let relative = item
                    .simspec
                    .parent()
                    .and_then(|p| p.strip_prefix(&self.raw_root).ok())
                    .ok_or_else(|| {
                        PipelineError::log_path(
                            item.simspec.display().to_string(),
                            "input path is not under the raw root",
                        )
                    })?;
                outdir.join(relative)
            }
            None => item
                .simspec
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        Ok(parent.join(log_name))
    }
}
