//! Line-oriented Sigma text writer
//!
//! Section order is fixed: header, description, authors, dates and license,
//! level, tag-like lists, logsource, detection, fields.

use super::detection::{Detection, DetectionCondition, SigmaCondition, SigmaModifier};
use super::SigmaRule;
use crate::rule::NamedList;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Plain scalars the YAML 1.2 core schema resolves to something other than a string
static CORE_SCHEMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?[0-9]+|0o[0-7]+|0x[0-9a-fA-F]+|0b[01]+|[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN)|null|Null|NULL|~|true|True|TRUE|false|False|FALSE)$",
    )
    .expect("Invalid regex pattern")
});

/// Render a Sigma rule without checking required fields
pub fn render(rule: &SigmaRule) -> String {
    let meta = &rule.metadata;
    let mut lines = Vec::new();

    lines.push(format!("title: {}", scalar(&meta.title)));
    lines.push(format!("id: {}", scalar(&meta.id)));
    lines.push(format!("status: {}", meta.status));
    optional(&mut lines, "description", &meta.description);
    list(&mut lines, "authors", &meta.authors);
    optional(&mut lines, "date", &meta.date);
    optional(&mut lines, "modified", &meta.modified);
    optional(&mut lines, "license", &meta.license);
    lines.push(format!("level: {}", meta.level));
    list(&mut lines, "tags", &rule.tags);
    list(&mut lines, "references", &rule.references);
    list(&mut lines, "falsepositives", &rule.falsepositives);

    lines.push("logsource:".to_string());
    for (key, value) in rule.logsource.entries() {
        lines.push(format!("  {key}: {}", scalar(value)));
    }

    detection(&mut lines, &rule.detection);
    list(&mut lines, "fields", &rule.fields);

    lines.join("\n")
}

fn optional(lines: &mut Vec<String>, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        lines.push(format!("{key}: {}", scalar(value)));
    }
}

fn list(lines: &mut Vec<String>, key: &str, values: &NamedList<String>) {
    if values.is_empty() {
        return;
    }
    lines.push(format!("{key}:"));
    for value in values {
        lines.push(format!("  - {}", scalar(value)));
    }
}

fn detection(lines: &mut Vec<String>, detection: &Detection) {
    lines.push("detection:".to_string());

    if !detection.selection.is_empty() {
        lines.push("  selection:".to_string());
        if detection.condition == DetectionCondition::Any {
            for condition in &detection.selection {
                lines.push(format!(
                    "    - {}: {}",
                    scalar(&selection_key(condition)),
                    quoted(&condition.value)
                ));
            }
        } else {
            for (key, values) in grouped(&detection.selection) {
                if let [value] = values.as_slice() {
                    lines.push(format!("    {}: {}", scalar(&key), quoted(value)));
                } else {
                    let key = if key.ends_with("|all") {
                        key
                    } else {
                        format!("{key}|all")
                    };
                    lines.push(format!("    {}:", scalar(&key)));
                    for value in values {
                        lines.push(format!("      - {}", quoted(value)));
                    }
                }
            }
        }
    }

    if !detection.keywords.is_empty() {
        lines.push("  keywords:".to_string());
        for keyword in &detection.keywords {
            lines.push(format!("    - {}", quoted(keyword)));
        }
    }

    if detection.has_filter() {
        lines.push("  filter:".to_string());
        for line in detection.filter.lines().map(str::trim_end) {
            if !line.trim().is_empty() {
                lines.push(format!("    {line}"));
            }
        }
    }

    if detection.needs_condition() {
        lines.push(format!("  condition: {}", scalar(&detection.expression())));
    }
    if detection.has_timeframe() {
        lines.push(format!("  timeframe: {}", scalar(detection.timeframe.trim())));
    }
}

/// `field|modifier`, or the bare field for `equals`
pub fn selection_key(condition: &SigmaCondition) -> String {
    let field = condition.field.trim();
    match condition.modifier {
        SigmaModifier::Equals => field.to_string(),
        modifier => format!("{field}|{modifier}"),
    }
}

/// Merge conditions sharing a key so the selection map has no duplicate keys
fn grouped(selection: &NamedList<SigmaCondition>) -> Vec<(String, Vec<&str>)> {
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    for condition in selection {
        let key = selection_key(condition);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, values)) => values.push(condition.value.as_str()),
            None => groups.push((key, vec![condition.value.as_str()])),
        }
    }
    groups
}

/// YAML double-quoted scalar
pub fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Plain YAML scalar when it reads back unchanged, quoted otherwise
pub fn scalar(value: &str) -> Cow<'_, str> {
    if is_plain_safe(value) {
        return Cow::Borrowed(value);
    }
    if value.chars().any(char::is_control) {
        return Cow::Owned(quoted(value));
    }
    Cow::Owned(format!("'{}'", value.replace('\'', "''")))
}

fn is_plain_safe(value: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
        '`',
    ];
    const RESERVED: &[&str] = &[
        "true", "false", "null", "yes", "no", "on", "off", "~", "---", "...",
    ];

    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.trim() != value || value.chars().any(char::is_control) {
        return false;
    }
    // A leading dash is fine when it is not a sequence marker (e.g. "-enc")
    if INDICATORS.contains(&first) && !(first == '-' && value.len() > 1 && !value.starts_with("- "))
    {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    if RESERVED.contains(&value.to_lowercase().as_str())
        || CORE_SCHEMA.is_match(value)
        || value.parse::<f64>().is_ok()
    {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Condition;

    #[test]
    fn test_scalar_plain_and_quoted() {
        assert_eq!(scalar("Suspicious PowerShell"), "Suspicious PowerShell");
        assert_eq!(scalar("2024-01-01"), "2024-01-01");
        assert_eq!(scalar("Detects: things"), "'Detects: things'");
        assert_eq!(scalar("it's #1"), "'it''s #1'");
        assert_eq!(scalar("-enc"), "-enc");
        assert_eq!(scalar("#hash"), "'#hash'");
        assert_eq!(scalar("true"), "'true'");
        assert_eq!(scalar("4624"), "'4624'");
        assert_eq!(scalar("*wild"), "'*wild'");
        assert_eq!(scalar("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(scalar(""), "''");
    }

    #[test]
    fn test_scalar_quotes_core_schema_values() {
        for value in ["0x10", "0o17", "0b101", ".inf", "-.Inf", ".NaN", "+12", "1e3", ".5", "Null", "~"] {
            assert_eq!(scalar(value), format!("'{value}'"), "{value}");
        }
        assert_eq!(scalar("0x10-sample"), "0x10-sample");
        assert_eq!(scalar("v1.0"), "v1.0");
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(quoted(r"C:\Windows"), r#""C:\\Windows""#);
        assert_eq!(quoted(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn test_selection_key() {
        assert_eq!(
            selection_key(&Condition::new("Image", SigmaModifier::EndsWith, "\\cmd.exe")),
            "Image|endswith"
        );
        assert_eq!(
            selection_key(&Condition::new("EventID", SigmaModifier::Equals, "1")),
            "EventID"
        );
    }

    #[test]
    fn test_grouped_merges_same_key() {
        let selection: NamedList<SigmaCondition> = vec![
            Condition::new("CommandLine", SigmaModifier::Contains, "-enc"),
            Condition::new("Image", SigmaModifier::EndsWith, "powershell.exe"),
            Condition::new("CommandLine", SigmaModifier::Contains, "-nop"),
        ]
        .into();

        let groups = grouped(&selection);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("CommandLine|contains".to_string(), vec!["-enc", "-nop"]));
    }
}
