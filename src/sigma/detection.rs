//! Sigma detection: selection conditions, filter, keywords and the combining expression

use crate::error::RuleError;
use crate::rule::{Condition, NamedList};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sigma value modifier applied to a selection condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigmaModifier {
    /// Substring match
    Contains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
    /// Base64 encoded value
    Base64,
    /// Base64 encoded value at any offset
    Base64Offset,
    /// UTF-16 encoded value
    Utf16,
    /// UTF-16 little endian
    Utf16Le,
    /// UTF-16 big endian
    Utf16Be,
    /// Wide (UTF-16LE) value
    Wide,
    /// Regular expression
    Re,
    /// All values must match
    All,
    /// Exact match, rendered without a modifier
    #[default]
    Equals,
    /// Windows dash variants (`-`, `/`, en dash...)
    Windash,
}

impl SigmaModifier {
    /// Every modifier
    pub const ALL: [SigmaModifier; 13] = [
        SigmaModifier::Contains,
        SigmaModifier::StartsWith,
        SigmaModifier::EndsWith,
        SigmaModifier::Base64,
        SigmaModifier::Base64Offset,
        SigmaModifier::Utf16,
        SigmaModifier::Utf16Le,
        SigmaModifier::Utf16Be,
        SigmaModifier::Wide,
        SigmaModifier::Re,
        SigmaModifier::All,
        SigmaModifier::Equals,
        SigmaModifier::Windash,
    ];

    /// Modifier keyword
    pub fn as_str(self) -> &'static str {
        match self {
            SigmaModifier::Contains => "contains",
            SigmaModifier::StartsWith => "startswith",
            SigmaModifier::EndsWith => "endswith",
            SigmaModifier::Base64 => "base64",
            SigmaModifier::Base64Offset => "base64offset",
            SigmaModifier::Utf16 => "utf16",
            SigmaModifier::Utf16Le => "utf16le",
            SigmaModifier::Utf16Be => "utf16be",
            SigmaModifier::Wide => "wide",
            SigmaModifier::Re => "re",
            SigmaModifier::All => "all",
            SigmaModifier::Equals => "equals",
            SigmaModifier::Windash => "windash",
        }
    }
}

impl fmt::Display for SigmaModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigmaModifier {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SigmaModifier::ALL
            .into_iter()
            .find(|modifier| modifier.as_str() == wanted)
            .ok_or_else(|| RuleError::invalid_value("sigma modifier", s))
    }
}

/// A Sigma selection condition
pub type SigmaCondition = Condition<SigmaModifier>;

/// How the detection blocks combine into the `condition:` scalar
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionCondition {
    /// Every selection condition must hold
    #[default]
    All,
    /// Any selection condition may hold
    Any,
    /// Hand-written expression, emitted verbatim (e.g. `selection | count() > 5`)
    Count(String),
}

/// Detection block of a Sigma rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detection {
    /// Committed selection conditions, in emission order
    pub selection: NamedList<SigmaCondition>,
    /// Free keyword search terms
    pub keywords: NamedList<String>,
    /// Body of the `filter:` block, one YAML line per line
    pub filter: String,
    /// Combination rule
    pub condition: DetectionCondition,
    /// Correlation window such as `5m`
    pub timeframe: String,
}

impl Detection {
    /// Whether a filter block will be emitted
    pub fn has_filter(&self) -> bool {
        !self.filter.trim().is_empty()
    }

    /// Whether a timeframe will be emitted
    pub fn has_timeframe(&self) -> bool {
        !self.timeframe.trim().is_empty()
    }

    /// Whether the `condition:` scalar will be emitted
    pub fn needs_condition(&self) -> bool {
        !self.selection.is_empty()
            || !self.keywords.is_empty()
            || self.has_filter()
            || self.has_timeframe()
    }

    /// Build the `condition:` expression from the present blocks
    pub fn expression(&self) -> String {
        if let DetectionCondition::Count(expression) = &self.condition {
            if !expression.trim().is_empty() {
                return expression.trim().to_string();
            }
        }

        let any = self.condition == DetectionCondition::Any;
        let mut terms = Vec::new();
        if !self.selection.is_empty() {
            terms.push("selection");
        }
        if !self.keywords.is_empty() {
            terms.push("keywords");
        }

        let positive = match terms.len() {
            0 => None,
            1 => Some(terms[0].to_string()),
            _ if any && self.has_filter() => Some(format!("({})", terms.join(" or "))),
            _ if any => Some(terms.join(" or ")),
            _ => Some(terms.join(" and ")),
        };

        match (positive, self.has_filter()) {
            (Some(positive), true) => format!("{positive} and not filter"),
            (Some(positive), false) => positive,
            (None, true) => "not filter".to_string(),
            (None, false) if any => "1 of them".to_string(),
            (None, false) => "all of them".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection_with_selection() -> Detection {
        let mut detection = Detection::default();
        detection
            .selection
            .insert(Condition::new("CommandLine", SigmaModifier::Contains, "-enc"));
        detection
    }

    #[test]
    fn test_modifier_parse() {
        for modifier in SigmaModifier::ALL {
            assert_eq!(modifier.as_str().parse::<SigmaModifier>().unwrap(), modifier);
        }
        assert!("endswithfield".parse::<SigmaModifier>().is_err());
    }

    #[test]
    fn test_expression_all_and_filter() {
        let mut detection = detection_with_selection();
        assert_eq!(detection.expression(), "selection");

        detection.filter = "User: SYSTEM".to_string();
        assert_eq!(detection.expression(), "selection and not filter");

        detection.keywords.insert("mimikatz".to_string());
        assert_eq!(detection.expression(), "selection and keywords and not filter");
    }

    #[test]
    fn test_expression_any() {
        let mut detection = detection_with_selection();
        detection.condition = DetectionCondition::Any;
        detection.keywords.insert("mimikatz".to_string());
        assert_eq!(detection.expression(), "selection or keywords");

        detection.filter = "User: SYSTEM".to_string();
        assert_eq!(detection.expression(), "(selection or keywords) and not filter");
    }

    #[test]
    fn test_expression_count_and_fallbacks() {
        let mut detection = detection_with_selection();
        detection.condition = DetectionCondition::Count("selection | count() by Host > 5".to_string());
        assert_eq!(detection.expression(), "selection | count() by Host > 5");

        detection.condition = DetectionCondition::Count("  ".to_string());
        assert_eq!(detection.expression(), "selection");

        let mut empty = Detection::default();
        empty.timeframe = "5m".to_string();
        assert!(empty.needs_condition());
        assert_eq!(empty.expression(), "all of them");

        empty.filter = "User: SYSTEM".to_string();
        assert_eq!(empty.expression(), "not filter");
    }
}
