//! Bundles of rendered rules
//!
//! A rule set collects finished rules of any kind and writes one combined file
//! per kind. It is the place where identifiers must be unique across rules:
//! a second Snort rule with a SID already in the set is refused.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{Result, RuleError};
use crate::rule::{Outcome, RuleKind};
use crate::session::{Draft, Export, Session};
use crate::sigma::SigmaRule;
use crate::snort::SnortRule;
use crate::yara::YaraRule;

/// Ordered collection of rendered rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules in insertion order
    rules: Vec<BundledRule>,
    /// Position of each rule by kind and identifying key
    rule_index: HashMap<(RuleKind, String), usize>,
    /// Counters kept while loading
    metadata: RuleSetMetadata,
}

/// A rule that passed validation and was rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledRule {
    /// Language of the rule
    pub kind: RuleKind,
    /// SID for Snort, id for Sigma, rule name for YARA
    pub key: String,
    /// Rendered text without a trailing newline
    pub text: String,
}

/// Counters about the rule set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSetMetadata {
    /// Rules accepted
    pub total_rules: usize,
    /// Rules refused because their key was taken
    pub duplicate_rules: usize,
    /// Files that could not be read or rendered
    pub failed_rules: usize,
}

fn key_of(draft: &Draft) -> String {
    match draft {
        Draft::Sigma(SigmaRule { metadata, .. }) => metadata.id.clone(),
        Draft::Snort(rule) => rule.sid().unwrap_or_default().to_string(),
        Draft::Yara(YaraRule { metadata, .. }) => crate::rule::underscored(&metadata.rule_name),
    }
}

fn key_name(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::Sigma => "id",
        RuleKind::Snort => "sid",
        RuleKind::Yara => "rule name",
    }
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a draft and add it
    ///
    /// Incomplete drafts fail with a validation error. A draft whose key is
    /// already taken is refused through the returned [`Outcome`].
    pub fn add(&mut self, draft: &Draft) -> Result<Outcome> {
        let kind = draft.kind();
        let text = draft.render()?;
        let key = key_of(draft);

        if self.rule_index.contains_key(&(kind, key.clone())) {
            warn!(%kind, key = %key, "Rule set already holds this rule");
            self.metadata.duplicate_rules += 1;
            return Ok(Outcome::rejected(format!(
                "{kind} {} {key} is already in the rule set",
                key_name(kind)
            )));
        }

        debug!(%kind, key = %key, "Adding rule to set");
        self.rule_index.insert((kind, key.clone()), self.rules.len());
        self.rules.push(BundledRule { kind, key, text });
        self.metadata.total_rules += 1;
        Ok(Outcome::Applied)
    }

    /// Add the draft of a session
    pub fn add_session(&mut self, session: &Session) -> Result<Outcome> {
        self.add(session.draft())
    }

    /// Load every `*.json` session file in a directory, in file name order
    ///
    /// With `fail_on_error` the first unreadable or incomplete file aborts the
    /// load; otherwise it is logged and counted in [`RuleSetMetadata::failed_rules`].
    pub fn load_directory(&mut self, dir: impl AsRef<Path>, fail_on_error: bool) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(RuleError::Configuration(format!(
                "Directory not found: {}",
                dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        for path in paths {
            match self.load_session_file(&path) {
                Ok(Outcome::Applied) => {}
                Ok(outcome) => warn!(path = %path.display(), %outcome, "Skipped rule"),
                Err(e) => {
                    error!("Failed to load rule {}: {}", path.display(), e);
                    self.metadata.failed_rules += 1;
                    if fail_on_error {
                        return Err(e);
                    }
                }
            }
        }

        info!(
            "Loaded rule set: {} rules, {} duplicates, {} failed",
            self.metadata.total_rules, self.metadata.duplicate_rules, self.metadata.failed_rules
        );
        Ok(())
    }

    fn load_session_file(&mut self, path: &Path) -> Result<Outcome> {
        debug!("Loading session from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let session: Session = serde_json::from_str(&text)?;
        self.add_session(&session)
    }

    /// Whether a Snort SID is taken
    pub fn has_sid(&self, sid: u32) -> bool {
        self.rule_index
            .contains_key(&(RuleKind::Snort, sid.to_string()))
    }

    /// Look up a rule by kind and key
    pub fn get(&self, kind: RuleKind, key: &str) -> Option<&BundledRule> {
        self.rule_index
            .get(&(kind, key.to_string()))
            .map(|&index| &self.rules[index])
    }

    /// Rules in insertion order
    pub fn rules(&self) -> &[BundledRule] {
        &self.rules
    }

    /// Get the number of rules in the set
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Load counters
    pub fn metadata(&self) -> &RuleSetMetadata {
        &self.metadata
    }

    /// Kinds present, in [`RuleKind`] order
    pub fn kinds(&self) -> Vec<RuleKind> {
        RuleKind::ALL
            .into_iter()
            .filter(|kind| self.rules.iter().any(|rule| rule.kind == *kind))
            .collect()
    }

    /// Combined text of every rule of one kind
    ///
    /// Snort rules go one per line, YARA rules are separated by a blank line and
    /// Sigma rules become documents of one YAML stream.
    pub fn render(&self, kind: RuleKind) -> String {
        let separator = match kind {
            RuleKind::Sigma => "\n---\n",
            RuleKind::Snort => "\n",
            RuleKind::Yara => "\n\n",
        };
        self.rules
            .iter()
            .filter(|rule| rule.kind == kind)
            .map(|rule| rule.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// One export per kind present, named `<stem>.<extension>`
    pub fn exports(&self, stem: &str) -> Vec<Export> {
        self.kinds()
            .into_iter()
            .map(|kind| Export {
                file_name: format!("{stem}.{}", kind.extension()),
                contents: format!("{}\n", self.render(kind)),
            })
            .collect()
    }
}

impl TryFrom<Vec<SnortRule>> for RuleSet {
    type Error = RuleError;

    /// Bundle Snort rules, refusing SID collisions
    fn try_from(rules: Vec<SnortRule>) -> Result<Self> {
        let mut set = RuleSet::new();
        for rule in rules {
            if let Outcome::Rejected(reason) = set.add(&Draft::Snort(rule))? {
                return Err(RuleError::Configuration(reason));
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleDraft;
    use crate::snort::SnortCommand;

    fn snort(sid: u32, msg: &str) -> Draft {
        let rule = SnortRule::new(sid, "")
            .apply(SnortCommand::SetMsg(msg.to_string()))
            .state;
        Draft::Snort(rule)
    }

    #[test]
    fn test_duplicate_sid_rejected() {
        let mut set = RuleSet::new();
        assert_eq!(set.add(&snort(100_001, "one")).unwrap(), Outcome::Applied);
        let outcome = set.add(&snort(100_001, "two")).unwrap();
        assert!(matches!(outcome, Outcome::Rejected(_)));
        assert_eq!(set.len(), 1);
        assert!(set.has_sid(100_001));
        assert_eq!(set.metadata().duplicate_rules, 1);
    }

    #[test]
    fn test_incomplete_rule_is_error() {
        let mut set = RuleSet::new();
        let draft = Draft::Snort(SnortRule::new(100_002, ""));
        assert!(set.add(&draft).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_render_joins_by_kind() {
        let mut set = RuleSet::new();
        set.add(&snort(100_001, "one")).unwrap();
        set.add(&snort(100_002, "two")).unwrap();
        let text = set.render(RuleKind::Snort);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().contains("sid:100002"));
        assert_eq!(set.render(RuleKind::Yara), "");

        let exports = set.exports("bundle");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].file_name, "bundle.rules");
    }

    #[test]
    fn test_try_from_snort_rules() {
        let a = SnortRule::new(100_010, "").apply(SnortCommand::SetMsg("a".into())).state;
        let b = SnortRule::new(100_010, "").apply(SnortCommand::SetMsg("b".into())).state;
        assert!(RuleSet::try_from(vec![a.clone()]).is_ok());
        assert!(RuleSet::try_from(vec![a, b]).is_err());
    }
}
