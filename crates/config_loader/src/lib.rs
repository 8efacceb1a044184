//! # Config Loader
//!
//! Blueprint loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON blueprint files
//! - Validate blueprint legality
//! - Produce a `RunBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("dispatch.toml")).unwrap();
//! println!("raw root: {}", blueprint.paths.raw_root.display());
//! ```

mod parser;
mod validator;

pub use contracts::RunBlueprint;
pub use parser::ConfigFormat;

use contracts::PipelineError;
use std::path::Path;

/// Blueprint loader
///
/// Provides static methods to load a blueprint from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a blueprint from a file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RunBlueprint, PipelineError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a blueprint from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RunBlueprint, PipelineError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize a RunBlueprint to a TOML string
    pub fn to_toml(blueprint: &RunBlueprint) -> Result<String, PipelineError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| PipelineError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a RunBlueprint to a JSON string
    pub fn to_json(blueprint: &RunBlueprint) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| PipelineError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from the file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, PipelineError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            PipelineError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            PipelineError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read blueprint file content
    fn read_file(path: &Path) -> Result<String, PipelineError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate blueprint content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RunBlueprint, PipelineError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[paths]
raw_root = "/data/sim/raw"
prod_root = "/data/sim/prod"

[fastframe]
program = "fastframe"
format = "frame"

[dispatch]
workers = 4
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.dispatch.workers, 4);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.paths.raw_root, bp2.paths.raw_root);
        assert_eq!(bp.instrument.channels, bp2.instrument.channels);
        assert_eq!(bp.dispatch.workers, bp2.dispatch.workers);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.paths.prod_root, bp2.paths.prod_root);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Zero workers parses fine but must fail validation
        let content = r#"
[paths]
raw_root = "/raw"
prod_root = "/prod"

[dispatch]
workers = 0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("workers"));
    }
}
