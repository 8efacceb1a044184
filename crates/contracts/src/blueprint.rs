//! RunBlueprint - Config Loader output
//!
//! Describes one complete dispatch run: data roots, the external simulator
//! invocation, instrument geometry, exposure selection, worker scheduling.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{Channel, DataLayout, Flavor, FrameFormat};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete dispatch run blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Data tree roots
    pub paths: PathsConfig,

    /// External simulator invocation
    #[serde(default)]
    pub fastframe: FastframeConfig,

    /// Instrument geometry (defines the expected-output set)
    #[serde(default)]
    pub instrument: InstrumentConfig,

    /// Exposure selection rules
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Worker scheduling
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Input and output tree roots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the raw night/expid tree holding simspec inputs
    pub raw_root: PathBuf,

    /// Root the simulator writes its frame artifacts under
    pub prod_root: PathBuf,
}

/// How to invoke the external simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastframeConfig {
    /// Program name or path
    #[serde(default = "default_program")]
    pub program: String,

    /// Extra pass-through arguments appended verbatim
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Output artifact family
    #[serde(default)]
    pub format: FrameFormat,
}

fn default_program() -> String {
    "fastframe".to_string()
}

impl Default for FastframeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extra_args: Vec::new(),
            format: FrameFormat::default(),
        }
    }
}

/// Instrument geometry: which cameras one exposure produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Wavelength channels
    #[serde(default = "default_channels")]
    pub channels: Vec<Channel>,

    /// Number of spectrographs (cameras per channel)
    #[serde(default = "default_spectrographs")]
    pub spectrographs: u8,
}

fn default_channels() -> Vec<Channel> {
    vec![Channel::B, Channel::R, Channel::Z]
}

fn default_spectrographs() -> u8 {
    10
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            spectrographs: default_spectrographs(),
        }
    }
}

/// Which exposures are eligible for dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Flavor whitelist: anything else is skipped with a notice
    #[serde(default = "default_flavors")]
    pub flavors: Vec<Flavor>,
}

fn default_flavors() -> Vec<Flavor> {
    vec![Flavor::Flat, Flavor::Science]
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            flavors: default_flavors(),
        }
    }
}

/// Worker scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Number of cooperating workers (static strided partition)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Exit nonzero when any item fails
    #[serde(default)]
    pub strict: bool,

    /// Per-item wall-clock limit in seconds; 0 = unlimited
    #[serde(default)]
    pub item_timeout_secs: u64,
}

fn default_workers() -> usize {
    1
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            strict: false,
            item_timeout_secs: 0,
        }
    }
}

impl DispatchConfig {
    /// Effective per-item timeout, `None` when unlimited
    pub fn item_timeout(&self) -> Option<Duration> {
        (self.item_timeout_secs > 0).then(|| Duration::from_secs(self.item_timeout_secs))
    }
}

impl RunBlueprint {
    /// Build the path resolver for this run
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.paths.raw_root, &self.paths.prod_root)
    }

    /// The full camera set of the configured instrument
    pub fn cameras(&self) -> Vec<crate::Camera> {
        crate::Camera::enumerate(&self.instrument.channels, self.instrument.spectrographs)
    }

    /// Whether a flavor is whitelisted for dispatch
    pub fn wants_flavor(&self, flavor: &Flavor) -> bool {
        self.selection.flavors.contains(flavor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> RunBlueprint {
        RunBlueprint {
            version: ConfigVersion::V1,
            paths: PathsConfig {
                raw_root: "/data/sim/raw".into(),
                prod_root: "/data/sim/prod".into(),
            },
            fastframe: FastframeConfig::default(),
            instrument: InstrumentConfig::default(),
            selection: SelectionConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }

    #[test]
    fn defaults_match_reference_instrument() {
        let bp = sample_blueprint();
        assert_eq!(bp.cameras().len(), 30);
        assert_eq!(bp.fastframe.program, "fastframe");
        assert_eq!(bp.dispatch.workers, 1);
        assert!(bp.dispatch.item_timeout().is_none());
    }

    #[test]
    fn default_whitelist_is_flat_and_science() {
        let bp = sample_blueprint();
        assert!(bp.wants_flavor(&Flavor::Flat));
        assert!(bp.wants_flavor(&Flavor::Science));
        assert!(!bp.wants_flavor(&Flavor::Arc));
        assert!(!bp.wants_flavor(&Flavor::Dark));
    }

    #[test]
    fn timeout_zero_means_unlimited() {
        let mut bp = sample_blueprint();
        bp.dispatch.item_timeout_secs = 90;
        assert_eq!(bp.dispatch.item_timeout(), Some(Duration::from_secs(90)));
        bp.dispatch.item_timeout_secs = 0;
        assert_eq!(bp.dispatch.item_timeout(), None);
    }
}
