//! Blueprint parsing.
//!
//! TOML is the primary format; JSON is accepted for generated configs.

use contracts::{PipelineError, RunBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML blueprint
pub fn parse_toml(content: &str) -> Result<RunBlueprint, PipelineError> {
    toml::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON blueprint
pub fn parse_json(content: &str) -> Result<RunBlueprint, PipelineError> {
    serde_json::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RunBlueprint, PipelineError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
