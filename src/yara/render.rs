//! Braces-delimited rule text

use super::strings::escape;
use super::YaraRule;
use crate::rule::underscored;

/// Render the rule
pub fn render(rule: &YaraRule) -> String {
    let mut lines = Vec::new();

    let mut head = format!("rule {}", underscored(&rule.metadata.rule_name));
    if !rule.tags.is_empty() {
        let tags: Vec<&str> = rule.tags.iter().map(String::as_str).collect();
        head.push_str(" : ");
        head.push_str(&tags.join(" "));
    }
    head.push_str(" {");
    lines.push(head);

    lines.push("  meta:".to_string());
    for (key, value) in rule.metadata.pairs() {
        lines.push(format!("    {key} = \"{}\"", escape(value)));
    }

    if !rule.strings.is_empty() {
        lines.push("  strings:".to_string());
        lines.extend(rule.strings.iter().map(|def| format!("    {def}")));
    }

    lines.push("  condition:".to_string());
    lines.push(format!("    {}", rule.condition.expression()));
    lines.push("}".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yara::{FileType, StringDef, StringMatch, StringModifier, StringType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_rule() {
        let mut rule = YaraRule::default();
        rule.metadata.rule_name = "Dropper Loader".to_string();
        rule.metadata.author = "SOC".to_string();
        rule.metadata.description = "Loads \"stage2\"".to_string();
        rule.metadata.version = "1.0".to_string();
        rule.tags.insert("malware".to_string());
        rule.tags.insert("dropper".to_string());
        rule.strings.insert(StringDef::new("mz", StringType::Hex, "4D 5A"));
        rule.strings.insert(
            StringDef::new("url", StringType::Text, "stage2.bin").with(StringModifier::Nocase),
        );
        rule.condition.strings = StringMatch::All;
        rule.condition.filesize_kb = Some(200);
        rule.condition.filetype = Some(FileType::Pe);

        let expected = [
            "rule Dropper_Loader : malware dropper {",
            "  meta:",
            "    author = \"SOC\"",
            "    description = \"Loads \\\"stage2\\\"\"",
            "    version = \"1.0\"",
            "  strings:",
            "    $mz = { 4D 5A }",
            "    $url = \"stage2.bin\" nocase",
            "  condition:",
            "    all of them and filesize < 200KB and uint16(0) == 0x5A4D",
            "}",
        ]
        .join("\n");
        assert_eq!(render(&rule), expected);
    }

    #[test]
    fn test_no_strings_no_section() {
        let mut rule = YaraRule::default();
        rule.metadata.rule_name = "Empty".to_string();
        assert_eq!(render(&rule), "rule Empty {\n  meta:\n  condition:\n    true\n}");
    }
}
