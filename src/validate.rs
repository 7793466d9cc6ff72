//! Required-field checks run before serialization
//!
//! The checks never mutate state. They return every violation at once so a
//! caller can show them together and keep preview or export disabled.

use crate::error::{Result, ValidationError};
use crate::rule::RuleKind;
use crate::sigma::SigmaRule;
use crate::snort::SnortRule;
use crate::yara::YaraRule;

/// Result of running the validation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Every required field is present
    Ok,
    /// One or more required fields are missing
    Invalid(Vec<String>),
}

impl Validation {
    /// `Ok` when there are no violations
    pub fn from_violations(violations: Vec<String>) -> Self {
        if violations.is_empty() {
            Validation::Ok
        } else {
            Validation::Invalid(violations)
        }
    }

    /// Whether the rule may be rendered
    pub fn is_ok(&self) -> bool {
        matches!(self, Validation::Ok)
    }

    /// Violation messages, empty when valid
    pub fn violations(&self) -> &[String] {
        match self {
            Validation::Ok => &[],
            Validation::Invalid(violations) => violations,
        }
    }

    /// Convert into a `Result`, attaching the rule kind to failures
    pub fn into_result(self, kind: RuleKind) -> Result<()> {
        match self {
            Validation::Ok => Ok(()),
            Validation::Invalid(violations) => Err(ValidationError::new(kind, violations).into()),
        }
    }
}

fn require(violations: &mut Vec<String>, value: &str, message: &str) {
    if value.trim().is_empty() {
        violations.push(message.to_string());
    }
}

/// Sigma: `title` and `id` must be non-empty
pub fn sigma_violations(rule: &SigmaRule) -> Vec<String> {
    let mut violations = Vec::new();
    require(&mut violations, &rule.metadata.title, "title is required");
    require(&mut violations, &rule.metadata.id, "id is required");
    violations
}

/// Snort: `msg` must be non-empty and a `sid` must be set
pub fn snort_violations(rule: &SnortRule) -> Vec<String> {
    let mut violations = Vec::new();
    require(&mut violations, &rule.options.msg, "msg is required");
    if rule.options.sid.is_none() {
        violations.push("sid is required".to_string());
    }
    violations
}

/// YARA: the rule name must be non-empty
pub fn yara_violations(rule: &YaraRule) -> Vec<String> {
    let mut violations = Vec::new();
    require(&mut violations, &rule.metadata.rule_name, "rule name is required");
    violations
}
