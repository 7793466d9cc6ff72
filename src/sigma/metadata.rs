//! Sigma header fields: title, id, status, level and dates

use crate::error::RuleError;
use crate::rule::NamedList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity level of a Sigma rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// No level chosen
    #[default]
    None,
    /// Informational only
    Informational,
    /// Low severity
    Low,
    /// Medium severity
    Medium,
    /// High severity
    High,
    /// Critical severity
    Critical,
}

impl Level {
    /// All levels, lowest first
    pub const ALL: [Level; 6] = [
        Level::None,
        Level::Informational,
        Level::Low,
        Level::Medium,
        Level::High,
        Level::Critical,
    ];

    /// Name as it appears in the rendered rule
    pub fn as_str(self) -> &'static str {
        match self {
            Level::None => "None",
            Level::Informational => "Informational",
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
            Level::Critical => "Critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleError::invalid_value("level", s))
    }
}

/// Maturity status of a Sigma rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No status chosen
    #[default]
    None,
    /// Freshly written, may produce false positives
    Experimental,
    /// Under evaluation
    Test,
    /// Production ready
    Stable,
    /// Replaced or no longer maintained
    Deprecated,
    /// Cannot be used in its current state
    Unsupported,
}

impl Status {
    /// All statuses
    pub const ALL: [Status; 6] = [
        Status::None,
        Status::Experimental,
        Status::Test,
        Status::Stable,
        Status::Deprecated,
        Status::Unsupported,
    ];

    /// Name as it appears in the rendered rule
    pub fn as_str(self) -> &'static str {
        match self {
            Status::None => "None",
            Status::Experimental => "Experimental",
            Status::Test => "Test",
            Status::Stable => "Stable",
            Status::Deprecated => "Deprecated",
            Status::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleError::invalid_value("status", s))
    }
}

/// Descriptive header of a Sigma rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaMetadata {
    /// Rule title
    pub title: String,
    /// UUIDv4 identifier
    pub id: String,
    /// Free text description
    pub description: String,
    /// Rule authors, in credit order
    pub authors: NamedList<String>,
    /// Creation date (`YYYY-MM-DD`)
    pub date: String,
    /// Last modification date (`YYYY-MM-DD`)
    pub modified: String,
    /// Severity level
    pub level: Level,
    /// License of the rule text
    pub license: String,
    /// Maturity status
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!("high".parse::<Level>().unwrap(), Level::High);
        assert_eq!(" Critical ".parse::<Level>().unwrap(), Level::Critical);
        assert!("severe".parse::<Level>().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Stable.to_string(), "Stable");
        assert_eq!(Status::default().to_string(), "None");
        assert_eq!("experimental".parse::<Status>().unwrap(), Status::Experimental);
    }
}
