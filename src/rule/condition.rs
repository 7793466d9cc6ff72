//! Field/modifier/value triples

use super::Entry;
use serde::{Deserialize, Serialize};

/// Characters a field name cannot start with, since they open YAML syntax
const RESERVED_LEADING: &[char] = &[
    '-', '?', ',', '[', ']', '{', '}', '#', '&', '*', '!', '>', '\'', '"', '%', '@', '`',
];

/// A field/modifier/value match triple
///
/// The modifier vocabulary depends on the rule language, e.g.
/// [`SigmaModifier`](crate::sigma::SigmaModifier) for Sigma selections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition<M> {
    /// Event field the condition applies to
    pub field: String,
    /// How the value is compared
    pub modifier: M,
    /// Value to compare against
    pub value: String,
}

impl<M> Condition<M> {
    /// Create a new condition
    pub fn new(field: impl Into<String>, modifier: M, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            modifier,
            value: value.into(),
        }
    }

    /// Check the parts a condition cannot do without
    pub fn check(&self) -> Result<(), String> {
        if self.field.trim().is_empty() {
            return Err("condition field is empty".to_string());
        }
        if self.field.contains(|c: char| c.is_whitespace() || c == ':' || c == '|')
            || self.field.starts_with(RESERVED_LEADING)
        {
            return Err(format!("condition field '{}' is not a plain field name", self.field));
        }
        Ok(())
    }
}

impl<M: PartialEq> Entry for Condition<M> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_check() {
        assert!(Condition::new("CommandLine", (), "-enc").check().is_ok());
        assert!(Condition::new("  ", (), "x").check().is_err());
        assert!(Condition::new("Command Line", (), "x").check().is_err());
        assert!(Condition::new("Image|endswith", (), "x").check().is_err());
        assert!(Condition::new("#Image", (), "x").check().is_err());
        assert!(Condition::new("&anchor", (), "x").check().is_err());
        assert!(Condition::new("winlog.event_data.Image", (), "x").check().is_ok());
    }
}
