//! General rule options: msg, sid, rev, classtype, priority, references, metadata

use super::content::{check_text, CLAUSE_END, LIST_SEPARATORS};
use crate::error::RuleError;
use crate::rule::{Entry, NamedList};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification from the stock `classification.config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classtype {
    /// `attempted-admin`
    AttemptedAdmin,
    /// `attempted-user`
    AttemptedUser,
    /// `inappropriate-content`
    InappropriateContent,
    /// `policy-violation`
    PolicyViolation,
    /// `shellcode-detect`
    ShellcodeDetect,
    /// `successful-admin`
    SuccessfulAdmin,
    /// `successful-user`
    SuccessfulUser,
    /// `trojan-activity`
    TrojanActivity,
    /// `unsuccessful-user`
    UnsuccessfulUser,
    /// `web-application-attack`
    WebApplicationAttack,
    /// `attempted-dos`
    AttemptedDos,
    /// `attempted-recon`
    AttemptedRecon,
    /// `bad-unknown`
    BadUnknown,
    /// `default-login-attempt`
    DefaultLoginAttempt,
    /// `denial-of-service`
    DenialOfService,
    /// `misc-attack`
    MiscAttack,
    /// `non-standard-protocol`
    NonStandardProtocol,
    /// `rpc-portmap-decode`
    RpcPortmapDecode,
    /// `successful-dos`
    SuccessfulDos,
    /// `successful-recon-largescale`
    SuccessfulReconLargescale,
    /// `successful-recon-limited`
    SuccessfulReconLimited,
    /// `suspicious-filename-detect`
    SuspiciousFilenameDetect,
    /// `suspicious-login`
    SuspiciousLogin,
    /// `system-call-detect`
    SystemCallDetect,
    /// `unusual-client-port-connection`
    UnusualClientPortConnection,
    /// `web-application-activity`
    WebApplicationActivity,
    /// `icmp-event`
    IcmpEvent,
    /// `misc-activity`
    MiscActivity,
    /// `network-scan`
    NetworkScan,
    /// `not-suspicious`
    NotSuspicious,
    /// `protocol-command-decode`
    ProtocolCommandDecode,
    /// `string-detect`
    StringDetect,
    /// `unknown`
    Unknown,
    /// `tcp-connection`
    TcpConnection,
}

impl Classtype {
    /// Every classtype, highest default priority first
    pub const ALL: [Classtype; 34] = [
        Classtype::AttemptedAdmin,
        Classtype::AttemptedUser,
        Classtype::InappropriateContent,
        Classtype::PolicyViolation,
        Classtype::ShellcodeDetect,
        Classtype::SuccessfulAdmin,
        Classtype::SuccessfulUser,
        Classtype::TrojanActivity,
        Classtype::UnsuccessfulUser,
        Classtype::WebApplicationAttack,
        Classtype::AttemptedDos,
        Classtype::AttemptedRecon,
        Classtype::BadUnknown,
        Classtype::DefaultLoginAttempt,
        Classtype::DenialOfService,
        Classtype::MiscAttack,
        Classtype::NonStandardProtocol,
        Classtype::RpcPortmapDecode,
        Classtype::SuccessfulDos,
        Classtype::SuccessfulReconLargescale,
        Classtype::SuccessfulReconLimited,
        Classtype::SuspiciousFilenameDetect,
        Classtype::SuspiciousLogin,
        Classtype::SystemCallDetect,
        Classtype::UnusualClientPortConnection,
        Classtype::WebApplicationActivity,
        Classtype::IcmpEvent,
        Classtype::MiscActivity,
        Classtype::NetworkScan,
        Classtype::NotSuspicious,
        Classtype::ProtocolCommandDecode,
        Classtype::StringDetect,
        Classtype::Unknown,
        Classtype::TcpConnection,
    ];

    /// Keyword as written in the rule
    pub fn as_str(self) -> &'static str {
        match self {
            Classtype::AttemptedAdmin => "attempted-admin",
            Classtype::AttemptedUser => "attempted-user",
            Classtype::InappropriateContent => "inappropriate-content",
            Classtype::PolicyViolation => "policy-violation",
            Classtype::ShellcodeDetect => "shellcode-detect",
            Classtype::SuccessfulAdmin => "successful-admin",
            Classtype::SuccessfulUser => "successful-user",
            Classtype::TrojanActivity => "trojan-activity",
            Classtype::UnsuccessfulUser => "unsuccessful-user",
            Classtype::WebApplicationAttack => "web-application-attack",
            Classtype::AttemptedDos => "attempted-dos",
            Classtype::AttemptedRecon => "attempted-recon",
            Classtype::BadUnknown => "bad-unknown",
            Classtype::DefaultLoginAttempt => "default-login-attempt",
            Classtype::DenialOfService => "denial-of-service",
            Classtype::MiscAttack => "misc-attack",
            Classtype::NonStandardProtocol => "non-standard-protocol",
            Classtype::RpcPortmapDecode => "rpc-portmap-decode",
            Classtype::SuccessfulDos => "successful-dos",
            Classtype::SuccessfulReconLargescale => "successful-recon-largescale",
            Classtype::SuccessfulReconLimited => "successful-recon-limited",
            Classtype::SuspiciousFilenameDetect => "suspicious-filename-detect",
            Classtype::SuspiciousLogin => "suspicious-login",
            Classtype::SystemCallDetect => "system-call-detect",
            Classtype::UnusualClientPortConnection => "unusual-client-port-connection",
            Classtype::WebApplicationActivity => "web-application-activity",
            Classtype::IcmpEvent => "icmp-event",
            Classtype::MiscActivity => "misc-activity",
            Classtype::NetworkScan => "network-scan",
            Classtype::NotSuspicious => "not-suspicious",
            Classtype::ProtocolCommandDecode => "protocol-command-decode",
            Classtype::StringDetect => "string-detect",
            Classtype::Unknown => "unknown",
            Classtype::TcpConnection => "tcp-connection",
        }
    }

    /// Priority the stock classification assigns (1 = highest)
    pub fn default_priority(self) -> u8 {
        match self {
            Classtype::AttemptedAdmin
            | Classtype::AttemptedUser
            | Classtype::InappropriateContent
            | Classtype::PolicyViolation
            | Classtype::ShellcodeDetect
            | Classtype::SuccessfulAdmin
            | Classtype::SuccessfulUser
            | Classtype::TrojanActivity
            | Classtype::UnsuccessfulUser
            | Classtype::WebApplicationAttack => 1,
            Classtype::IcmpEvent
            | Classtype::MiscActivity
            | Classtype::NetworkScan
            | Classtype::NotSuspicious
            | Classtype::ProtocolCommandDecode
            | Classtype::StringDetect
            | Classtype::Unknown => 3,
            Classtype::TcpConnection => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for Classtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classtype {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Classtype::ALL
            .into_iter()
            .find(|classtype| classtype.as_str() == wanted)
            .ok_or_else(|| RuleError::invalid_value("classtype", s))
    }
}

/// External reference (`reference:<type>,<value>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference system, e.g. `url`, `cve`, `bugtraq`
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier within that system
    pub value: String,
}

impl Reference {
    /// Create a reference
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.kind.trim().is_empty() || self.value.trim().is_empty() {
            return Err("reference needs both a type and a value".to_string());
        }
        if self.kind.contains(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            return Err(format!("reference type '{}' is not a single word", self.kind));
        }
        check_text("reference value", self.value.trim(), CLAUSE_END)
    }
}

impl Entry for Reference {}

/// User-entered `metadata` key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    /// Metadata key
    pub key: String,
    /// Value; cannot contain `;` or `,`
    pub value: String,
}

impl MetadataPair {
    /// Create a pair
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.key.trim().is_empty() || self.value.trim().is_empty() {
            return Err("metadata needs both a key and a value".to_string());
        }
        if self.key.contains(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            return Err(format!("metadata key '{}' is not a single word", self.key));
        }
        check_text("metadata value", self.value.trim(), LIST_SEPARATORS)
    }
}

impl Entry for MetadataPair {}

/// General options of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// Alert message
    pub msg: String,
    /// Signature ID
    pub sid: Option<u32>,
    /// Revision number
    pub rev: u32,
    /// Classification type
    pub classtype: Option<Classtype>,
    /// Priority (1-4, 1 = highest)
    pub priority: Option<u8>,
    /// External references
    pub references: NamedList<Reference>,
    /// Basic metadata pairs, emitted before the extended metadata
    pub metadata: NamedList<MetadataPair>,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            msg: String::new(),
            sid: None,
            rev: 1,
            classtype: None,
            priority: None,
            references: NamedList::new(),
            metadata: NamedList::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classtype_round_trip() {
        for classtype in Classtype::ALL {
            assert_eq!(classtype.as_str().parse::<Classtype>().unwrap(), classtype);
        }
        assert_eq!(
            serde_json::to_string(&Classtype::WebApplicationAttack).unwrap(),
            "\"web-application-attack\""
        );
    }

    #[test]
    fn test_classtype_default_priority() {
        assert_eq!(Classtype::TrojanActivity.default_priority(), 1);
        assert_eq!(Classtype::AttemptedRecon.default_priority(), 2);
        assert_eq!(Classtype::NetworkScan.default_priority(), 3);
        assert_eq!(Classtype::TcpConnection.default_priority(), 4);
    }

    #[test]
    fn test_reference_check() {
        assert!(Reference::new("url", "example.com/advisory").check().is_ok());
        assert!(Reference::new("", "x").check().is_err());
        assert!(Reference::new("u r l", "x").check().is_err());
        assert!(MetadataPair::new("affected_product", "Windows").check().is_ok());
        assert!(MetadataPair::new("key", " ").check().is_err());
        assert!(Reference::new("url", "example.com/a;b").check().is_err());
        assert!(Reference::new("url", "example.com/a,b").check().is_ok());
        assert!(MetadataPair::new("k", "x, y").check().is_err());
        assert!(MetadataPair::new("k", "x; y").check().is_err());
    }
}
