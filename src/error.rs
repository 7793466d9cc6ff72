/// Error types for rule authoring and serialization
use crate::rule::RuleKind;
use std::fmt::Display;
use thiserror::Error;

/// Main error type for rulecraft operations
#[derive(Error, Debug)]
pub enum RuleError {
    /// Required fields are missing, so the rule cannot be rendered
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A textual value does not belong to the expected vocabulary
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Name of the field or vocabulary being parsed
        field: &'static str,
        /// The rejected input
        value: String,
    },

    /// Configuration is invalid or could not be loaded
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// YAML (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleError {
    pub(crate) fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        RuleError::InvalidValue {
            field,
            value: value.into(),
        }
    }

    /// Violation messages when this is a validation failure
    pub fn violations(&self) -> Option<&[String]> {
        match self {
            RuleError::Validation(err) => Some(&err.violations),
            _ => None,
        }
    }
}

/// Result type alias for rulecraft operations
pub type Result<T> = std::result::Result<T, RuleError>;

/// Raised when a rule is serialized while required fields are blank
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule language whose draft failed validation
    pub kind: RuleKind,
    /// Human-readable violation messages, in check order
    pub violations: Vec<String>,
}

impl ValidationError {
    /// Create a validation error for a rule kind
    pub fn new(kind: RuleKind, violations: Vec<String>) -> Self {
        Self { kind, violations }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rule is incomplete ({} violation{})",
            self.kind,
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for (i, violation) in self.violations.iter().enumerate() {
            write!(f, "\n  [{}] {}", i + 1, violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(
            RuleKind::Snort,
            vec!["msg is required".to_string(), "sid is required".to_string()],
        );

        let display = err.to_string();
        assert!(display.starts_with("snort rule is incomplete (2 violations)"));
        assert!(display.contains("[1] msg is required"));
        assert!(display.contains("[2] sid is required"));
    }

    #[test]
    fn test_violations_accessor() {
        let err: RuleError =
            ValidationError::new(RuleKind::Yara, vec!["rule name is required".to_string()])
                .into();
        assert_eq!(err.violations(), Some(&["rule name is required".to_string()][..]));
        assert_eq!(err.to_string(), "yara rule is incomplete (1 violation)\n  [1] rule name is required");

        let err = RuleError::invalid_value("level", "extreme");
        assert!(err.violations().is_none());
        assert_eq!(err.to_string(), "Invalid value for level: extreme");
    }
}
