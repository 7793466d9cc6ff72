//! YARA rule builder
//!
//! # Example
//!
//! ```
//! use rulecraft::rule::{ListOp, RuleDraft};
//! use rulecraft::yara::{StringDef, StringMatch, StringType, YaraCommand, YaraRule};
//!
//! let rule = YaraRule::default()
//!     .apply(YaraCommand::SetRuleName("Test Rule".to_string())).state
//!     .apply(YaraCommand::Strings(ListOp::Add(StringDef::new("a", StringType::Text, "evil")))).state
//!     .apply(YaraCommand::SetStringMatch(StringMatch::All))
//!     .state;
//!
//! assert_eq!(
//!     rule.render().unwrap(),
//!     "rule Test_Rule {\n  meta:\n  strings:\n    $a = \"evil\"\n  condition:\n    all of them\n}"
//! );
//! assert_eq!(rule.export_name(), "Test_Rule.yar");
//! ```

use crate::config::YaraDefaults;
use crate::rule::{non_blank, underscored, Applied, ListOp, NamedList, Outcome, RuleDraft, RuleKind};
use serde::{Deserialize, Serialize};

pub mod condition;
pub mod render;
pub mod strings;

pub use condition::{FileType, StringMatch, YaraCondition};
pub use strings::{is_identifier, StringDef, StringModifier, StringType};

/// `meta:` values of a rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YaraMetadata {
    /// Rule identifier; whitespace becomes `_` when rendered
    pub rule_name: String,
    /// `author` meta
    pub author: String,
    /// `description` meta
    pub description: String,
    /// `reference` meta
    pub reference: String,
    /// `hash` meta
    pub hash: String,
    /// `version` meta
    pub version: String,
}

impl YaraMetadata {
    /// Non-empty `meta:` pairs in emission order; the rule name is not one of them
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("author", self.author.as_str()),
            ("description", self.description.as_str()),
            ("reference", self.reference.as_str()),
            ("hash", self.hash.as_str()),
            ("version", self.version.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
    }

    fn field_mut(&mut self, field: MetaField) -> &mut String {
        match field {
            MetaField::Author => &mut self.author,
            MetaField::Description => &mut self.description,
            MetaField::Reference => &mut self.reference,
            MetaField::Hash => &mut self.hash,
            MetaField::Version => &mut self.version,
        }
    }
}

/// `meta:` keys settable through [`YaraCommand::SetMeta`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaField {
    /// `author`
    Author,
    /// `description`
    Description,
    /// `reference`
    Reference,
    /// `hash`
    Hash,
    /// `version`
    Version,
}

/// Structured state of a YARA rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YaraRule {
    /// Rule name and `meta:` values
    pub metadata: YaraMetadata,
    /// String definitions, unique by identifier
    pub strings: NamedList<StringDef>,
    /// Tags after the rule name
    pub tags: NamedList<String>,
    /// Structured `condition:` section
    pub condition: YaraCondition,
}

/// Edits accepted by a [`YaraRule`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YaraCommand {
    /// Set the rule name
    SetRuleName(String),
    /// Set a `meta:` value, blank clears
    SetMeta {
        /// Key to set
        field: MetaField,
        /// New value
        value: String,
    },
    /// Edit the string definitions
    Strings(ListOp<StringDef>),
    /// Edit the tags
    Tags(ListOp<String>),
    /// Choose between no string clause, `all of them` and `any of them`
    SetStringMatch(StringMatch),
    /// Set or clear the file size bound in KB
    SetFilesize(Option<u64>),
    /// Set or clear the file type check
    SetFileType(Option<FileType>),
}

impl YaraRule {
    /// Create an unnamed rule with configured defaults
    pub fn with_defaults(defaults: &YaraDefaults) -> Self {
        let mut rule = Self::default();
        rule.metadata.author = defaults.author.trim().to_string();
        rule.metadata.version = defaults.version.trim().to_string();
        rule
    }
}

fn check_name(name: &str) -> Result<(), String> {
    let token = underscored(name);
    if !is_identifier(&token) || token.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("'{name}' is not a valid rule identifier"));
    }
    Ok(())
}

fn check_tag(tag: &str) -> Result<(), String> {
    if is_identifier(tag) {
        Ok(())
    } else {
        Err(format!("tag '{tag}' must match [A-Za-z0-9_]+"))
    }
}

impl RuleDraft for YaraRule {
    type Command = YaraCommand;

    const KIND: RuleKind = RuleKind::Yara;

    fn violations(&self) -> Vec<String> {
        crate::validate::yara_violations(self)
    }

    fn render_unchecked(&self) -> String {
        render::render(self)
    }

    fn export_name(&self) -> String {
        format!("{}.yar", underscored(&self.metadata.rule_name))
    }

    fn apply(mut self, command: YaraCommand) -> Applied<Self> {
        let outcome = match command {
            YaraCommand::SetRuleName(name) => match non_blank(&name) {
                None => {
                    self.metadata.rule_name.clear();
                    Outcome::Applied
                }
                Some(name) => match check_name(&name) {
                    Ok(()) => {
                        self.metadata.rule_name = name;
                        Outcome::Applied
                    }
                    Err(reason) => Outcome::Rejected(reason),
                },
            },
            YaraCommand::SetMeta { field, value } => {
                *self.metadata.field_mut(field) = non_blank(&value).unwrap_or_default();
                Outcome::Applied
            }
            YaraCommand::Strings(op) => self.strings.apply_checked(op, StringDef::check),
            YaraCommand::Tags(op) => {
                let op = match op {
                    ListOp::Add(tag) => ListOp::Add(tag.trim().to_string()),
                    ListOp::Update(index, tag) => ListOp::Update(index, tag.trim().to_string()),
                    other => other,
                };
                self.tags.apply_checked(op, |tag| check_tag(tag))
            }
            YaraCommand::SetStringMatch(matching) => {
                self.condition.strings = matching;
                Outcome::Applied
            }
            YaraCommand::SetFilesize(Some(0)) => Outcome::rejected("filesize bound must be positive"),
            YaraCommand::SetFilesize(kb) => {
                self.condition.filesize_kb = kb;
                Outcome::Applied
            }
            YaraCommand::SetFileType(filetype) => {
                self.condition.filetype = filetype;
                Outcome::Applied
            }
        };
        Applied::new(self, outcome)
    }
}
