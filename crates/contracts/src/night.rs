//! Night identifiers and half-open night ranges.
//!
//! Nights are compared as plain strings. Callers must supply zero-padded
//! fixed-width dates (`YYYYMMDD`) for the ordering to be meaningful; the
//! parser strips common separators but performs no calendar arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PipelineError;

/// One observing night, stored as its canonical 8-char `YYYYMMDD` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Night(String);

impl Night {
    /// Parse a night string, accepting `20200101`, `2020-01-01`,
    /// `2020/01/01`, etc. Separators are stripped before validation.
    pub fn parse(value: &str) -> Result<Self, PipelineError> {
        let canonical: String = value
            .chars()
            .filter(|c| !matches!(c, '-' | '/' | ':'))
            .collect();

        if canonical.len() != 8 {
            return Err(PipelineError::invalid_night(
                value,
                format!("expected 8 digits after separator stripping, got {}", canonical.len()),
            ));
        }
        if !canonical.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PipelineError::invalid_night(value, "non-digit character"));
        }

        Ok(Self(canonical))
    }

    /// Canonical 8-char form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Night {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Night {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Night {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Night> for String {
    fn from(night: Night) -> Self {
        night.0
    }
}

/// Half-open night selection: `start <= night < stop`.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightRange {
    /// Inclusive lower bound
    #[serde(default)]
    pub start: Option<Night>,

    /// Exclusive upper bound
    #[serde(default)]
    pub stop: Option<Night>,
}

impl NightRange {
    /// Range covering every night
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build from optional raw strings (CLI form)
    pub fn from_bounds(start: Option<&str>, stop: Option<&str>) -> Result<Self, PipelineError> {
        Ok(Self {
            start: start.map(Night::parse).transpose()?,
            stop: stop.map(Night::parse).transpose()?,
        })
    }

    /// Half-open membership test
    pub fn contains(&self, night: &Night) -> bool {
        if let Some(ref start) = self.start {
            if night < start {
                return false;
            }
        }
        if let Some(ref stop) = self.stop {
            if night >= stop {
                return false;
            }
        }
        true
    }
}
