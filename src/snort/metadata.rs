//! Extended metadata folded into the `metadata:` option

use crate::error::RuleError;
use crate::rule::NamedList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `signature_severity` values used by the ET ruleset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureSeverity {
    /// No direct threat
    Informational,
    /// Low impact activity
    Minor,
    /// Likely compromise or attack attempt
    Major,
    /// Confirmed compromise
    Critical,
}

impl SignatureSeverity {
    /// Every severity, lowest first
    pub const ALL: [SignatureSeverity; 4] = [
        SignatureSeverity::Informational,
        SignatureSeverity::Minor,
        SignatureSeverity::Major,
        SignatureSeverity::Critical,
    ];

    /// Value as written in the rule
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureSeverity::Informational => "Informational",
            SignatureSeverity::Minor => "Minor",
            SignatureSeverity::Major => "Major",
            SignatureSeverity::Critical => "Critical",
        }
    }
}

impl fmt::Display for SignatureSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureSeverity {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureSeverity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleError::invalid_value("signature severity", s))
    }
}

/// Scalar fields of [`RuleMetadata`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
    /// `policy`
    Policy,
    /// `former_category`
    FormerCategory,
}

impl MetadataField {
    /// Key written before the value
    pub fn key(self) -> &'static str {
        match self {
            MetadataField::CreatedAt => "created_at",
            MetadataField::UpdatedAt => "updated_at",
            MetadataField::Policy => "policy",
            MetadataField::FormerCategory => "former_category",
        }
    }
}

/// List fields of [`RuleMetadata`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataList {
    /// `attack_target`
    AttackTarget,
    /// `deployment`
    Deployment,
    /// `tag`
    Tag,
    /// `malware_family`
    MalwareFamily,
}

impl MetadataList {
    /// Key written for each list item
    pub fn key(self) -> &'static str {
        match self {
            MetadataList::AttackTarget => "attack_target",
            MetadataList::Deployment => "deployment",
            MetadataList::Tag => "tag",
            MetadataList::MalwareFamily => "malware_family",
        }
    }
}

/// Enhanced metadata of a rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMetadata {
    /// Creation date, `YYYY_MM_DD` or `YYYY-MM-DD`
    pub created_at: String,
    /// Last update date, same format as `created_at`
    pub updated_at: String,
    /// Policy such as `balanced-ips` or `security-ips drop`
    pub policy: String,
    /// Category the rule was filed under before a move
    pub former_category: String,
    /// ET style severity
    pub signature_severity: Option<SignatureSeverity>,
    /// Targeted asset classes, e.g. `Client_Endpoint`
    pub attack_target: NamedList<String>,
    /// Where the rule is meant to run, e.g. `Perimeter`
    pub deployment: NamedList<String>,
    /// Free tags
    pub tag: NamedList<String>,
    /// Malware families the rule detects
    pub malware_family: NamedList<String>,
}

impl RuleMetadata {
    pub(crate) fn field_mut(&mut self, field: MetadataField) -> &mut String {
        match field {
            MetadataField::CreatedAt => &mut self.created_at,
            MetadataField::UpdatedAt => &mut self.updated_at,
            MetadataField::Policy => &mut self.policy,
            MetadataField::FormerCategory => &mut self.former_category,
        }
    }

    pub(crate) fn list_mut(&mut self, list: MetadataList) -> &mut NamedList<String> {
        match list {
            MetadataList::AttackTarget => &mut self.attack_target,
            MetadataList::Deployment => &mut self.deployment,
            MetadataList::Tag => &mut self.tag,
            MetadataList::MalwareFamily => &mut self.malware_family,
        }
    }

    /// `key value` entries in emission order: scalars first, then one entry per list item
    pub fn entries(&self) -> Vec<String> {
        let scalars = [
            ("created_at", self.created_at.trim()),
            ("updated_at", self.updated_at.trim()),
            ("policy", self.policy.trim()),
            ("former_category", self.former_category.trim()),
            (
                "signature_severity",
                self.signature_severity.map_or("", SignatureSeverity::as_str),
            ),
        ];
        let mut entries: Vec<String> = scalars
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key} {value}"))
            .collect();

        for (list, values) in [
            (MetadataList::AttackTarget, &self.attack_target),
            (MetadataList::Deployment, &self.deployment),
            (MetadataList::Tag, &self.tag),
            (MetadataList::MalwareFamily, &self.malware_family),
        ] {
            entries.extend(values.iter().map(|value| format!("{} {}", list.key(), value)));
        }
        entries
    }
}
