//! Blueprint validation
//!
//! Rules:
//! - raw_root / prod_root non-empty
//! - fastframe.program non-empty
//! - channels non-empty and unique
//! - spectrographs in 1..=10
//! - flavor whitelist non-empty and unique
//! - workers >= 1

use std::collections::HashSet;

use contracts::{PipelineError, RunBlueprint};

/// Validate a RunBlueprint.
///
/// Returns the first violation encountered, or Ok(()).
pub fn validate(blueprint: &RunBlueprint) -> Result<(), PipelineError> {
    validate_paths(blueprint)?;
    validate_fastframe(blueprint)?;
    validate_instrument(blueprint)?;
    validate_selection(blueprint)?;
    validate_dispatch(blueprint)?;
    Ok(())
}

fn validate_paths(blueprint: &RunBlueprint) -> Result<(), PipelineError> {
    if blueprint.paths.raw_root.as_os_str().is_empty() {
        return Err(PipelineError::config_validation(
            "paths.raw_root",
            "raw_root cannot be empty",
        ));
    }
    if blueprint.paths.prod_root.as_os_str().is_empty() {
        return Err(PipelineError::config_validation(
            "paths.prod_root",
            "prod_root cannot be empty",
        ));
    }
    Ok(())
}

fn validate_fastframe(blueprint: &RunBlueprint) -> Result<(), PipelineError> {
    if blueprint.fastframe.program.trim().is_empty() {
        return Err(PipelineError::config_validation(
            "fastframe.program",
            "program cannot be empty",
        ));
    }
    Ok(())
}

fn validate_instrument(blueprint: &RunBlueprint) -> Result<(), PipelineError> {
    let instrument = &blueprint.instrument;

    if instrument.channels.is_empty() {
        return Err(PipelineError::config_validation(
            "instrument.channels",
            "at least one channel is required",
        ));
    }

    let mut seen = HashSet::new();
    for channel in &instrument.channels {
        if !seen.insert(channel) {
            return Err(PipelineError::config_validation(
                "instrument.channels",
                format!("duplicate channel '{channel}'"),
            ));
        }
    }

    if instrument.spectrographs == 0 || instrument.spectrographs > 10 {
        return Err(PipelineError::config_validation(
            "instrument.spectrographs",
            format!(
                "spectrographs must be in 1..=10, got {}",
                instrument.spectrographs
            ),
        ));
    }

    Ok(())
}

fn validate_selection(blueprint: &RunBlueprint) -> Result<(), PipelineError> {
    let flavors = &blueprint.selection.flavors;

    if flavors.is_empty() {
        return Err(PipelineError::config_validation(
            "selection.flavors",
            "flavor whitelist cannot be empty",
        ));
    }

    let mut seen = HashSet::new();
    for flavor in flavors {
        if !seen.insert(flavor) {
            return Err(PipelineError::config_validation(
                "selection.flavors",
                format!("duplicate flavor '{flavor}'"),
            ));
        }
    }

    Ok(())
}

fn validate_dispatch(blueprint: &RunBlueprint) -> Result<(), PipelineError> {
    if blueprint.dispatch.workers == 0 {
        return Err(PipelineError::config_validation(
            "dispatch.workers",
            "workers must be >= 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        Channel, ConfigVersion, DispatchConfig, FastframeConfig, Flavor, InstrumentConfig,
        PathsConfig, SelectionConfig,
    };

    fn minimal_blueprint() -> RunBlueprint {
        RunBlueprint {
            version: ConfigVersion::V1,
            paths: PathsConfig {
                raw_root: "/raw".into(),
                prod_root: "/prod".into(),
            },
            fastframe: FastframeConfig::default(),
            instrument: InstrumentConfig::default(),
            selection: SelectionConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }

    #[test]
    fn valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn empty_raw_root() {
        let mut bp = minimal_blueprint();
        bp.paths.raw_root = "".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("raw_root"), "got: {err}");
    }

    #[test]
    fn empty_program() {
        let mut bp = minimal_blueprint();
        bp.fastframe.program = "  ".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("program cannot be empty"), "got: {err}");
    }

    #[test]
    fn duplicate_channel() {
        let mut bp = minimal_blueprint();
        bp.instrument.channels = vec![Channel::B, Channel::B];
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate channel"), "got: {err}");
    }

    #[test]
    fn spectrographs_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.instrument.spectrographs = 0;
        assert!(validate(&bp).is_err());
        bp.instrument.spectrographs = 11;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("1..=10"), "got: {err}");
    }

    #[test]
    fn empty_flavor_whitelist() {
        let mut bp = minimal_blueprint();
        bp.selection.flavors.clear();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("whitelist cannot be empty"), "got: {err}");
    }

    #[test]
    fn duplicate_flavor() {
        let mut bp = minimal_blueprint();
        bp.selection.flavors = vec![Flavor::Flat, Flavor::Flat];
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate flavor"), "got: {err}");
    }

    #[test]
    fn zero_workers() {
        let mut bp = minimal_blueprint();
        bp.dispatch.workers = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("workers must be >= 1"), "got: {err}");
    }
}
