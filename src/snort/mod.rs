//! Snort/Suricata rule builder
//!
//! A rule is a header tuple followed by a parenthesized option list:
//!
//! ```text
//! alert tcp $HOME_NET any -> $EXTERNAL_NET 80 (msg:"..."; sid:1000001; rev:1)
//! ```
//!
//! # Example
//!
//! ```
//! use rulecraft::rule::{ListOp, RuleDraft};
//! use rulecraft::snort::{ContentMatch, ContentModifier, Endpoint, SnortCommand, SnortRule};
//!
//! let rule = SnortRule::new(100_123, "2024-05-01")
//!     .apply(SnortCommand::SetMsg("Admin panel access".to_string())).state
//!     .apply(SnortCommand::SetEndpoint { endpoint: Endpoint::DestPort, value: "80".to_string() }).state
//!     .apply(SnortCommand::Content(ListOp::Add(
//!         ContentMatch::new("/admin").with(ContentModifier::HttpUri),
//!     )))
//!     .state;
//!
//! let text = rule.render().unwrap();
//! assert!(text.starts_with("alert tcp any any -> any 80 (msg:\"Admin panel access\"; sid:100123; rev:1"));
//! assert!(text.contains("content:\"/admin\"; http_uri"));
//! assert_eq!(rule.export_name(), "snort_rule_100123.rules");
//! ```

use crate::config::SnortDefaults;
use crate::ident;
use crate::rule::{non_blank, Applied, ListOp, Outcome, RuleDraft, RuleKind};
use content::{check_text, CLAUSE_END, LIST_SEPARATORS};
use serde::{Deserialize, Serialize};

pub mod content;
pub mod header;
pub mod metadata;
pub mod options;
pub mod render;

pub use content::{ContentMatch, ContentModifier, Flowbit, FlowbitAction, PcreMatch, RuleContent};
pub use header::{Action, Direction, Protocol, RuleHeader};
pub use metadata::{MetadataField, MetadataList, RuleMetadata, SignatureSeverity};
pub use options::{Classtype, MetadataPair, Reference, RuleOptions};

/// Structured state of a Snort/Suricata rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnortRule {
    /// Action, protocol, addresses, ports and direction
    pub header: RuleHeader,
    /// msg, sid, rev and the other general options
    pub options: RuleOptions,
    /// Payload detection options
    pub content: RuleContent,
    /// Extended metadata
    pub metadata: RuleMetadata,
}

/// Address or port slot of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Source address
    SourceIp,
    /// Source port
    SourcePort,
    /// Destination address
    DestIp,
    /// Destination port
    DestPort,
}

/// Edits accepted by a [`SnortRule`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnortCommand {
    /// Set the rule action
    SetAction(Action),
    /// Set the protocol
    SetProtocol(Protocol),
    /// Set the traffic direction
    SetDirection(Direction),
    /// Set an address or port; blank means `any`
    SetEndpoint {
        /// Slot to set
        endpoint: Endpoint,
        /// Address, port, range or variable
        value: String,
    },
    /// Set the alert message
    SetMsg(String),
    /// Replace the signature id
    SetSid(u32),
    /// Set the revision, at least 1
    SetRev(u32),
    /// Set or clear the classtype
    SetClasstype(Option<Classtype>),
    /// Set or clear the priority (1-4)
    SetPriority(Option<u8>),
    /// Edit the references
    Reference(ListOp<Reference>),
    /// Edit the basic metadata pairs
    Metadata(ListOp<MetadataPair>),
    /// Edit the content matches
    Content(ListOp<ContentMatch>),
    /// Edit the modifiers of one content match
    ContentModifier {
        /// Position of the content match
        index: usize,
        /// Edit to apply
        op: ListOp<ContentModifier>,
    },
    /// Toggle negation of one content match
    SetNegated {
        /// Position of the content match
        index: usize,
        /// Whether the match is negated
        negated: bool,
    },
    /// Edit the pcre options
    Pcre(ListOp<PcreMatch>),
    /// Edit the flowbits
    Flowbit(ListOp<Flowbit>),
    /// Set the threshold, blank clears
    SetThreshold(String),
    /// Set the detection filter, blank clears
    SetDetectionFilter(String),
    /// Set a scalar extended metadata field, blank clears
    SetMetadataField {
        /// Field to set
        field: MetadataField,
        /// New value
        value: String,
    },
    /// Set or clear the signature severity
    SetSeverity(Option<SignatureSeverity>),
    /// Edit one of the extended metadata lists
    MetadataList {
        /// Which list
        list: MetadataList,
        /// Edit to apply
        op: ListOp<String>,
    },
}

impl SnortRule {
    /// Create a rule with the given sid; `date` seeds `created_at` and `updated_at`
    pub fn new(sid: u32, date: impl Into<String>) -> Self {
        let date = date.into();
        let mut rule = Self::default();
        rule.options.sid = Some(sid);
        rule.metadata.created_at = date.clone();
        rule.metadata.updated_at = date;
        rule
    }

    /// Create a rule with a random sid and today's date
    pub fn fresh() -> Self {
        Self::new(ident::generate_sid(), ident::today())
    }

    /// Create a rule and apply configured defaults
    pub fn with_defaults(sid: u32, date: impl Into<String>, defaults: &SnortDefaults) -> Self {
        let mut rule = Self::new(sid, date);
        rule.header = RuleHeader {
            action: defaults.action,
            protocol: defaults.protocol,
            source_ip: header::endpoint(&defaults.source_ip),
            source_port: header::endpoint(&defaults.source_port),
            direction: defaults.direction,
            dest_ip: header::endpoint(&defaults.dest_ip),
            dest_port: header::endpoint(&defaults.dest_port),
        };
        rule.options.classtype = defaults.classtype;
        rule.metadata.policy = defaults.policy.trim().to_string();
        rule
    }

    /// The signature id, if one is set
    pub fn sid(&self) -> Option<u32> {
        self.options.sid
    }

    fn endpoint_mut(&mut self, endpoint: Endpoint) -> &mut String {
        match endpoint {
            Endpoint::SourceIp => &mut self.header.source_ip,
            Endpoint::SourcePort => &mut self.header.source_port,
            Endpoint::DestIp => &mut self.header.dest_ip,
            Endpoint::DestPort => &mut self.header.dest_port,
        }
    }
}

fn set_text(slot: &mut String, value: &str, what: &str, reserved: &[char]) -> Outcome {
    let value = non_blank(value).unwrap_or_default();
    if let Err(reason) = check_text(what, &value, reserved) {
        return Outcome::Rejected(reason);
    }
    *slot = value;
    Outcome::Applied
}

impl RuleDraft for SnortRule {
    type Command = SnortCommand;

    const KIND: RuleKind = RuleKind::Snort;

    fn violations(&self) -> Vec<String> {
        crate::validate::snort_violations(self)
    }

    fn render_unchecked(&self) -> String {
        render::render(self)
    }

    fn export_name(&self) -> String {
        format!("snort_rule_{}.rules", self.options.sid.unwrap_or_default())
    }

    fn apply(mut self, command: SnortCommand) -> Applied<Self> {
        let outcome = match command {
            SnortCommand::SetAction(action) => {
                self.header.action = action;
                Outcome::Applied
            }
            SnortCommand::SetProtocol(protocol) => {
                self.header.protocol = protocol;
                Outcome::Applied
            }
            SnortCommand::SetDirection(direction) => {
                self.header.direction = direction;
                Outcome::Applied
            }
            SnortCommand::SetEndpoint { endpoint, value } => {
                *self.endpoint_mut(endpoint) = header::endpoint(&value);
                Outcome::Applied
            }
            SnortCommand::SetMsg(msg) => set_text(&mut self.options.msg, &msg, "msg", &[]),
            SnortCommand::SetSid(0) => Outcome::rejected("sid must be positive"),
            SnortCommand::SetSid(sid) => {
                self.options.sid = Some(sid);
                Outcome::Applied
            }
            SnortCommand::SetRev(0) => Outcome::rejected("rev must be at least 1"),
            SnortCommand::SetRev(rev) => {
                self.options.rev = rev;
                Outcome::Applied
            }
            SnortCommand::SetClasstype(classtype) => {
                self.options.classtype = classtype;
                Outcome::Applied
            }
            SnortCommand::SetPriority(Some(priority)) if !(1..=4).contains(&priority) => {
                Outcome::rejected(format!("priority {priority} is outside 1-4"))
            }
            SnortCommand::SetPriority(priority) => {
                self.options.priority = priority;
                Outcome::Applied
            }
            SnortCommand::Reference(op) => self.options.references.apply_checked(op, Reference::check),
            SnortCommand::Metadata(op) => self.options.metadata.apply_checked(op, MetadataPair::check),
            SnortCommand::Content(op) => self.content.content.apply_checked(op, ContentMatch::check),
            SnortCommand::ContentModifier { index, op } => match self.content.content.get_mut(index) {
                Some(content) => content.modifiers.apply(op),
                None => Outcome::NotFound,
            },
            SnortCommand::SetNegated { index, negated } => match self.content.content.get_mut(index) {
                Some(content) => {
                    content.negated = negated;
                    Outcome::Applied
                }
                None => Outcome::NotFound,
            },
            SnortCommand::Pcre(op) => self.content.pcre.apply_checked(op, PcreMatch::check),
            SnortCommand::Flowbit(op) => self.content.flowbits.apply_checked(op, Flowbit::check),
            SnortCommand::SetThreshold(threshold) => {
                set_text(&mut self.content.threshold, &threshold, "threshold", CLAUSE_END)
            }
            SnortCommand::SetDetectionFilter(filter) => set_text(
                &mut self.content.detection_filter,
                &filter,
                "detection_filter",
                CLAUSE_END,
            ),
            SnortCommand::SetMetadataField { field, value } => set_text(
                self.metadata.field_mut(field),
                &value,
                field.key(),
                LIST_SEPARATORS,
            ),
            SnortCommand::SetSeverity(severity) => {
                self.metadata.signature_severity = severity;
                Outcome::Applied
            }
            SnortCommand::MetadataList { list, op } => self
                .metadata
                .list_mut(list)
                .apply_text_checked(op, |value| check_text(list.key(), value, LIST_SEPARATORS)),
        };
        Applied::new(self, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> SnortRule {
        SnortRule::new(123456, "2024-01-01")
    }

    #[test]
    fn test_new_seeds_dates() {
        let rule = rule();
        assert_eq!(rule.sid(), Some(123456));
        assert_eq!(rule.metadata.created_at, "2024-01-01");
        assert_eq!(rule.metadata.updated_at, "2024-01-01");
        assert_eq!(rule.options.rev, 1);
    }

    #[test]
    fn test_fresh_sid_in_range() {
        let sid = SnortRule::fresh().sid().unwrap();
        assert!((ident::SID_MIN..=ident::SID_MAX).contains(&sid));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let applied = rule().apply(SnortCommand::SetPriority(Some(5)));
        assert!(matches!(applied.outcome, Outcome::Rejected(_)));
        assert_eq!(applied.state.options.priority, None);

        let applied = applied.state.apply(SnortCommand::SetRev(0));
        assert!(matches!(applied.outcome, Outcome::Rejected(_)));

        let applied = applied.state.apply(SnortCommand::SetSid(0));
        assert!(matches!(applied.outcome, Outcome::Rejected(_)));
        assert_eq!(applied.state.sid(), Some(123456));
    }

    #[test]
    fn test_blank_endpoint_is_any() {
        let applied = rule().apply(SnortCommand::SetEndpoint {
            endpoint: Endpoint::SourceIp,
            value: "  ".to_string(),
        });
        assert_eq!(applied.state.header.source_ip, "any");

        let applied = applied.state.apply(SnortCommand::SetEndpoint {
            endpoint: Endpoint::DestIp,
            value: "[10.0.0.0/8, 192.168.0.0/16]".to_string(),
        });
        assert_eq!(applied.state.header.dest_ip, "[10.0.0.0/8,192.168.0.0/16]");
    }

    #[test]
    fn test_content_modifier_commands() {
        let applied = rule().apply(SnortCommand::Content(ListOp::Add(ContentMatch::new("evil"))));
        assert!(applied.outcome.is_applied());

        let applied = applied.state.apply(SnortCommand::ContentModifier {
            index: 0,
            op: ListOp::Add(ContentModifier::Nocase),
        });
        assert!(applied.outcome.is_applied());

        let applied = applied.state.apply(SnortCommand::ContentModifier {
            index: 3,
            op: ListOp::Add(ContentModifier::Nocase),
        });
        assert_eq!(applied.outcome, Outcome::NotFound);

        let applied = applied.state.apply(SnortCommand::SetNegated { index: 0, negated: true });
        let text = applied.state.render_unchecked();
        assert!(text.contains("content:!\"evil\"; nocase"));
    }

    #[test]
    fn test_duplicate_reference_reported() {
        let add = || SnortCommand::Reference(ListOp::Add(Reference::new("cve", "2024-0001")));
        let applied = rule().apply(add());
        assert_eq!(applied.outcome, Outcome::Applied);
        let applied = applied.state.apply(add());
        assert_eq!(applied.outcome, Outcome::Duplicate);
        assert_eq!(applied.state.options.references.len(), 1);
    }

    #[test]
    fn test_free_text_cannot_split_the_rule() {
        let rejected = [
            SnortCommand::SetMsg("line1\nline2".to_string()),
            SnortCommand::SetThreshold("type limit; x".to_string()),
            SnortCommand::SetDetectionFilter("track by_src;count 5".to_string()),
            SnortCommand::SetMetadataField {
                field: MetadataField::Policy,
                value: "balanced-ips, security-ips".to_string(),
            },
            SnortCommand::SetMetadataField {
                field: MetadataField::FormerCategory,
                value: "MALWARE;x".to_string(),
            },
            SnortCommand::MetadataList {
                list: MetadataList::Tag,
                op: ListOp::Add("a;b".to_string()),
            },
            SnortCommand::MetadataList {
                list: MetadataList::Deployment,
                op: ListOp::Add("Perimeter, Internal".to_string()),
            },
            SnortCommand::Reference(ListOp::Add(Reference::new("url", "example.com/a;b"))),
            SnortCommand::Metadata(ListOp::Add(MetadataPair::new("k", "x, y; z"))),
            SnortCommand::Content(ListOp::Add(ContentMatch::new("GET\r\n"))),
        ];

        let mut state = rule();
        for command in rejected {
            let applied = state.apply(command.clone());
            assert!(
                matches!(applied.outcome, Outcome::Rejected(_)),
                "{command:?} was {}",
                applied.outcome
            );
            state = applied.state;
        }
        assert_eq!(state, rule());

        let state = state
            .apply(SnortCommand::SetMsg("Test".to_string()))
            .state
            .apply(SnortCommand::SetThreshold("type limit, track by_src, count 1, seconds 60".to_string()))
            .state;
        assert_eq!(state.render().unwrap().lines().count(), 1);
    }

    #[test]
    fn test_render_requires_msg() {
        let err = rule().render().unwrap_err();
        assert_eq!(err.violations(), Some(&["msg is required".to_string()][..]));
    }
}
