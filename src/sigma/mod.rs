//! Sigma rule builder
//!
//! Holds the structured state of one Sigma rule and renders it to the
//! line-oriented YAML text consumed by SIEM converters.
//!
//! # Example
//!
//! ```
//! use rulecraft::rule::{Condition, ListOp, RuleDraft};
//! use rulecraft::sigma::{Level, SigmaCommand, SigmaModifier, SigmaRule, Status};
//!
//! let rule = SigmaRule::new("0b2f4ab4-7c4c-4b9a-9a55-7fb8e1f9a6d1", "2024-05-01")
//!     .apply(SigmaCommand::SetTitle("Suspicious PowerShell".to_string())).state
//!     .apply(SigmaCommand::SetStatus(Status::Stable)).state
//!     .apply(SigmaCommand::SetLevel(Level::High)).state
//!     .apply(SigmaCommand::Selection(ListOp::Add(Condition::new(
//!         "CommandLine",
//!         SigmaModifier::Contains,
//!         "-enc",
//!     ))))
//!     .state;
//!
//! let text = rule.render().unwrap();
//! assert!(text.contains("    CommandLine|contains: \"-enc\""));
//! assert_eq!(rule.export_name(), "Suspicious_PowerShell.yml");
//! ```

use crate::config::SigmaDefaults;
use crate::ident;
use crate::rule::{underscored, Applied, ListOp, NamedList, Outcome, RuleDraft, RuleKind};
use serde::{Deserialize, Serialize};

pub mod detection;
pub mod logsource;
pub mod metadata;
pub mod render;

pub use detection::{Detection, DetectionCondition, SigmaCondition, SigmaModifier};
pub use logsource::{LogSource, LogSourceField};
pub use metadata::{Level, SigmaMetadata, Status};

/// Structured state of a Sigma rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaRule {
    /// Title, id, status and other header fields
    pub metadata: SigmaMetadata,
    /// Event stream the rule applies to
    pub logsource: LogSource,
    /// Selection, filter and condition
    pub detection: Detection,
    /// Tags such as `attack.execution`
    pub tags: NamedList<String>,
    /// External references
    pub references: NamedList<String>,
    /// Known false positive scenarios
    pub falsepositives: NamedList<String>,
    /// Fields worth showing alongside a match
    pub fields: NamedList<String>,
}

/// Text lists of a Sigma rule addressable by [`SigmaCommand::List`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigmaList {
    /// `authors`
    Authors,
    /// `tags`
    Tags,
    /// `references`
    References,
    /// `falsepositives`
    FalsePositives,
    /// `fields`
    Fields,
    /// `detection.keywords`
    Keywords,
}

/// Edits accepted by a [`SigmaRule`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigmaCommand {
    /// Set the title
    SetTitle(String),
    /// Replace the id; must be a UUIDv4
    SetId(String),
    /// Set the description
    SetDescription(String),
    /// Set the creation date (`YYYY-MM-DD`, blank clears)
    SetDate(String),
    /// Set the modification date (`YYYY-MM-DD`, blank clears)
    SetModified(String),
    /// Set the license
    SetLicense(String),
    /// Set the level
    SetLevel(Level),
    /// Set the status
    SetStatus(Status),
    /// Set one logsource sub-key
    SetLogSource {
        /// Sub-key to set
        field: LogSourceField,
        /// New value, blank clears
        value: String,
    },
    /// Edit the selection conditions
    Selection(ListOp<SigmaCondition>),
    /// Set the filter block body
    SetFilter(String),
    /// Set how detection blocks combine
    SetCondition(DetectionCondition),
    /// Set the timeframe
    SetTimeframe(String),
    /// Edit one of the text lists
    List {
        /// Which list
        list: SigmaList,
        /// Edit to apply
        op: ListOp<String>,
    },
}

impl SigmaRule {
    /// Create a rule with the given identifier and creation date
    pub fn new(id: impl Into<String>, date: impl Into<String>) -> Self {
        let mut rule = Self::default();
        rule.metadata.id = id.into();
        rule.metadata.date = date.into();
        rule
    }

    /// Create a rule with a fresh UUID and today's date
    pub fn fresh() -> Self {
        Self::new(ident::generate_uuid_v4(), ident::today())
    }

    /// Create a rule and apply configured defaults
    pub fn with_defaults(
        id: impl Into<String>,
        date: impl Into<String>,
        defaults: &SigmaDefaults,
    ) -> Self {
        let mut rule = Self::new(id, date);
        rule.metadata.authors = defaults.authors.iter().cloned().collect();
        rule.metadata.status = defaults.status;
        rule.metadata.level = defaults.level;
        rule.metadata.license = defaults.license.clone();
        rule
    }

    fn list_mut(&mut self, list: SigmaList) -> &mut NamedList<String> {
        match list {
            SigmaList::Authors => &mut self.metadata.authors,
            SigmaList::Tags => &mut self.tags,
            SigmaList::References => &mut self.references,
            SigmaList::FalsePositives => &mut self.falsepositives,
            SigmaList::Fields => &mut self.fields,
            SigmaList::Keywords => &mut self.detection.keywords,
        }
    }
}

fn set_date(slot: &mut String, value: String) -> Outcome {
    let value = value.trim();
    if !value.is_empty() && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Outcome::rejected(format!("'{value}' is not a YYYY-MM-DD date"));
    }
    *slot = value.to_string();
    Outcome::Applied
}

impl RuleDraft for SigmaRule {
    type Command = SigmaCommand;

    const KIND: RuleKind = RuleKind::Sigma;

    fn violations(&self) -> Vec<String> {
        crate::validate::sigma_violations(self)
    }

    fn render_unchecked(&self) -> String {
        render::render(self)
    }

    fn export_name(&self) -> String {
        format!("{}.yml", underscored(&self.metadata.title))
    }

    fn apply(mut self, command: SigmaCommand) -> Applied<Self> {
        let outcome = match command {
            SigmaCommand::SetTitle(title) => {
                self.metadata.title = title.trim().to_string();
                Outcome::Applied
            }
            SigmaCommand::SetId(id) => {
                let id = id.trim().to_lowercase();
                if ident::is_uuid_v4(&id) {
                    self.metadata.id = id;
                    Outcome::Applied
                } else {
                    Outcome::rejected(format!("'{id}' is not a UUIDv4"))
                }
            }
            SigmaCommand::SetDescription(description) => {
                self.metadata.description = description.trim().to_string();
                Outcome::Applied
            }
            SigmaCommand::SetDate(date) => set_date(&mut self.metadata.date, date),
            SigmaCommand::SetModified(date) => set_date(&mut self.metadata.modified, date),
            SigmaCommand::SetLicense(license) => {
                self.metadata.license = license.trim().to_string();
                Outcome::Applied
            }
            SigmaCommand::SetLevel(level) => {
                self.metadata.level = level;
                Outcome::Applied
            }
            SigmaCommand::SetStatus(status) => {
                self.metadata.status = status;
                Outcome::Applied
            }
            SigmaCommand::SetLogSource { field, value } => {
                self.logsource.set(field, &value);
                Outcome::Applied
            }
            SigmaCommand::Selection(op) => self.detection.selection.apply_checked(op, |c| c.check()),
            SigmaCommand::SetFilter(filter) => {
                self.detection.filter = filter;
                Outcome::Applied
            }
            SigmaCommand::SetCondition(condition) => {
                self.detection.condition = condition;
                Outcome::Applied
            }
            SigmaCommand::SetTimeframe(timeframe) => {
                self.detection.timeframe = timeframe.trim().to_string();
                Outcome::Applied
            }
            SigmaCommand::List { list, op } => self.list_mut(list).apply_text(op),
        };
        Applied::new(self, outcome)
    }
}
