//! Exposure identifiers and flavors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exposure id, rendered 8-digit zero-padded in directory and file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpId(pub u32);

impl ExpId {
    /// Zero-padded form used in on-disk names (`00000042`)
    pub fn padded(&self) -> String {
        format!("{:08}", self.0)
    }
}

impl fmt::Display for ExpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exposure flavor as recorded in the input header.
///
/// Unknown values are carried verbatim in `Other` so discovery can log a
/// skip notice instead of erroring on them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    Arc,
    Flat,
    Dark,
    Science,
    #[serde(untagged)]
    Other(String),
}

impl Flavor {
    /// Label used in logs and summaries
    pub fn label(&self) -> &str {
        match self {
            Flavor::Arc => "arc",
            Flavor::Flat => "flat",
            Flavor::Dark => "dark",
            Flavor::Science => "science",
            Flavor::Other(s) => s,
        }
    }
}

impl FromStr for Flavor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "arc" => Flavor::Arc,
            "flat" => Flavor::Flat,
            "dark" => Flavor::Dark,
            "science" => Flavor::Science,
            other => Flavor::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
