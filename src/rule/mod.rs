//! Shared rule model
//!
//! Every rule language builds on the same small vocabulary: a [`RuleKind`]
//! tag, the [`Condition`] match triple, the ordered [`NamedList`], and the
//! [`RuleDraft`] trait tying validation, rendering and command application
//! together.
//!
//! # Example
//!
//! ```
//! use rulecraft::rule::{Outcome, RuleDraft};
//! use rulecraft::snort::{SnortCommand, SnortRule};
//!
//! let rule = SnortRule::new(123456, "2024-01-01");
//! let applied = rule.apply(SnortCommand::SetMsg("Test".to_string()));
//! assert_eq!(applied.outcome, Outcome::Applied);
//!
//! let text = applied.state.render().unwrap();
//! assert!(text.starts_with("alert tcp any any -> any any (msg:\"Test\"; sid:123456; rev:1"));
//! ```

use crate::error::{Result, RuleError, ValidationError};
use crate::validate::Validation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod condition;
pub mod list;

pub use condition::Condition;
pub use list::{Entry, ListOp, NamedList};

/// The three supported rule languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Sigma log detection rule
    Sigma,
    /// Snort/Suricata network signature
    Snort,
    /// YARA pattern rule
    Yara,
}

impl RuleKind {
    /// All kinds, in display order
    pub const ALL: [RuleKind; 3] = [RuleKind::Sigma, RuleKind::Snort, RuleKind::Yara];

    /// File extension used when exporting this kind
    pub fn extension(self) -> &'static str {
        match self {
            RuleKind::Sigma => "yml",
            RuleKind::Snort => "rules",
            RuleKind::Yara => "yar",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Sigma => write!(f, "sigma"),
            RuleKind::Snort => write!(f, "snort"),
            RuleKind::Yara => write!(f, "yara"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sigma" => Ok(RuleKind::Sigma),
            "snort" | "suricata" => Ok(RuleKind::Snort),
            "yara" => Ok(RuleKind::Yara),
            _ => Err(RuleError::invalid_value("rule kind", s)),
        }
    }
}

/// What happened when a command was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed as requested
    Applied,
    /// The value was already present, the state is unchanged
    Duplicate,
    /// The addressed entry does not exist, the state is unchanged
    NotFound,
    /// The command was refused, the state is unchanged
    Rejected(String),
}

impl Outcome {
    /// Whether the command changed the state
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub(crate) fn rejected(reason: impl Into<String>) -> Self {
        Outcome::Rejected(reason.into())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => write!(f, "applied"),
            Outcome::Duplicate => write!(f, "already exists"),
            Outcome::NotFound => write!(f, "entry not found"),
            Outcome::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// New state produced by a command, together with its [`Outcome`]
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<S> {
    /// State after the command
    pub state: S,
    /// What the command did
    pub outcome: Outcome,
}

impl<S> Applied<S> {
    /// Pair a state with an outcome
    pub fn new(state: S, outcome: Outcome) -> Self {
        Self { state, outcome }
    }

    /// Transform the carried state, keeping the outcome
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Applied<T> {
        Applied {
            state: f(self.state),
            outcome: self.outcome,
        }
    }
}

/// Structured, editable state of one rule in one language
pub trait RuleDraft: Sized {
    /// Commands this draft accepts
    type Command;

    /// Language of the draft
    const KIND: RuleKind;

    /// Required-field violations; empty when the draft is exportable
    fn violations(&self) -> Vec<String>;

    /// Render the rule text without checking required fields
    fn render_unchecked(&self) -> String;

    /// File name the rendered rule is exported under
    fn export_name(&self) -> String;

    /// Apply one command, returning the new state
    fn apply(self, command: Self::Command) -> Applied<Self>;

    /// Run the validation layer
    fn validate(&self) -> Validation {
        Validation::from_violations(self.violations())
    }

    /// Validate, then render the rule text
    fn render(&self) -> Result<String> {
        match self.validate() {
            Validation::Ok => Ok(self.render_unchecked()),
            Validation::Invalid(violations) => {
                Err(ValidationError::new(Self::KIND, violations).into())
            }
        }
    }
}

/// Replace each run of whitespace with a single underscore
pub fn underscored(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Trim a value, returning `None` when nothing is left
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.to_string().parse::<RuleKind>().unwrap(), kind);
        }
        assert_eq!("Suricata".parse::<RuleKind>().unwrap(), RuleKind::Snort);
        assert!("sql".parse::<RuleKind>().is_err());
    }

    #[test]
    fn test_underscored() {
        assert_eq!(underscored("Suspicious PowerShell"), "Suspicious_PowerShell");
        assert_eq!(underscored("  Test \t Rule  "), "Test_Rule");
        assert_eq!(underscored("single"), "single");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Duplicate.to_string(), "already exists");
        assert_eq!(
            Outcome::rejected("sid must be positive").to_string(),
            "rejected: sid must be positive"
        );
        assert!(Outcome::Applied.is_applied());
        assert!(!Outcome::NotFound.is_applied());
    }
}
