//! Single-line rule text

use super::content::escape;
use super::SnortRule;

/// Render the rule as `<header> (<options>)`
///
/// A missing sid renders as `0`; callers go through
/// [`RuleDraft::render`](crate::rule::RuleDraft::render) to reject that case.
pub fn render(rule: &SnortRule) -> String {
    format!("{} ({})", rule.header, options(rule).join("; "))
}

/// Option clauses in emission order
pub fn options(rule: &SnortRule) -> Vec<String> {
    let options = &rule.options;
    let content = &rule.content;
    let mut clauses = vec![
        format!("msg:\"{}\"", escape(options.msg.trim())),
        format!("sid:{}", options.sid.unwrap_or_default()),
        format!("rev:{}", options.rev),
    ];

    if let Some(classtype) = options.classtype {
        clauses.push(format!("classtype:{classtype}"));
    }
    if let Some(priority) = options.priority {
        clauses.push(format!("priority:{priority}"));
    }

    clauses.extend(content.content.iter().map(|c| c.clause()));
    clauses.extend(content.pcre.iter().map(|p| p.clause()));
    clauses.extend(content.flowbits.iter().map(|f| f.clause()));

    if !content.threshold.trim().is_empty() {
        clauses.push(format!("threshold:{}", content.threshold.trim()));
    }
    if !content.detection_filter.trim().is_empty() {
        clauses.push(format!("detection_filter:{}", content.detection_filter.trim()));
    }

    clauses.extend(
        options
            .references
            .iter()
            .map(|r| format!("reference:{},{}", r.kind.trim(), r.value.trim())),
    );

    let mut metadata: Vec<String> = options
        .metadata
        .iter()
        .map(|pair| format!("{} {}", pair.key.trim(), pair.value.trim()))
        .collect();
    metadata.extend(rule.metadata.entries());
    if !metadata.is_empty() {
        clauses.push(format!("metadata:{}", metadata.join(", ")));
    }

    clauses
}
