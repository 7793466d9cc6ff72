//! Rule header: action, protocol, addresses, ports and direction

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule action - what to do when the rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Generate an alert
    #[default]
    Alert,
    /// Log the packet
    Log,
    /// Ignore the packet
    Pass,
    /// Alert and turn on a dynamic rule
    Activate,
    /// Stay idle until activated
    Dynamic,
    /// Drop the packet (IPS mode)
    Drop,
    /// Drop and send a reset or ICMP unreachable
    Reject,
    /// Drop silently, without logging
    Sdrop,
}

impl Action {
    /// Every action
    pub const ALL: [Action; 8] = [
        Action::Alert,
        Action::Log,
        Action::Pass,
        Action::Activate,
        Action::Dynamic,
        Action::Drop,
        Action::Reject,
        Action::Sdrop,
    ];

    /// Keyword as written in the rule
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Alert => "alert",
            Action::Log => "log",
            Action::Pass => "pass",
            Action::Activate => "activate",
            Action::Dynamic => "dynamic",
            Action::Drop => "drop",
            Action::Reject => "reject",
            Action::Sdrop => "sdrop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| RuleError::invalid_value("action", s))
    }
}

/// Protocol specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// `tcp`
    #[default]
    Tcp,
    /// `udp`
    Udp,
    /// `icmp`
    Icmp,
    /// `ip`
    Ip,
    // Application layer protocols
    /// `http`
    Http,
    /// `http2`
    Http2,
    /// `dns`
    Dns,
    /// `tls`
    Tls,
    /// `ssh`
    Ssh,
    /// `ftp`
    Ftp,
    /// `smtp`
    Smtp,
    /// `imap`
    Imap,
    /// `smb`
    Smb,
    /// `dcerpc`
    Dcerpc,
    /// `dhcp`
    Dhcp,
    /// `ntp`
    Ntp,
    /// `snmp`
    Snmp,
    /// `sip`
    Sip,
    /// `rdp`
    Rdp,
    /// `krb5`
    Krb5,
    /// `modbus`
    Modbus,
    /// `dnp3`
    Dnp3,
    /// `mqtt`
    Mqtt,
}

impl Protocol {
    /// Every protocol keyword
    pub const ALL: [Protocol; 23] = [
        Protocol::Tcp,
        Protocol::Udp,
        Protocol::Icmp,
        Protocol::Ip,
        Protocol::Http,
        Protocol::Http2,
        Protocol::Dns,
        Protocol::Tls,
        Protocol::Ssh,
        Protocol::Ftp,
        Protocol::Smtp,
        Protocol::Imap,
        Protocol::Smb,
        Protocol::Dcerpc,
        Protocol::Dhcp,
        Protocol::Ntp,
        Protocol::Snmp,
        Protocol::Sip,
        Protocol::Rdp,
        Protocol::Krb5,
        Protocol::Modbus,
        Protocol::Dnp3,
        Protocol::Mqtt,
    ];

    /// Keyword as written in the rule
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::Ip => "ip",
            Protocol::Http => "http",
            Protocol::Http2 => "http2",
            Protocol::Dns => "dns",
            Protocol::Tls => "tls",
            Protocol::Ssh => "ssh",
            Protocol::Ftp => "ftp",
            Protocol::Smtp => "smtp",
            Protocol::Imap => "imap",
            Protocol::Smb => "smb",
            Protocol::Dcerpc => "dcerpc",
            Protocol::Dhcp => "dhcp",
            Protocol::Ntp => "ntp",
            Protocol::Snmp => "snmp",
            Protocol::Sip => "sip",
            Protocol::Rdp => "rdp",
            Protocol::Krb5 => "krb5",
            Protocol::Modbus => "modbus",
            Protocol::Dnp3 => "dnp3",
            Protocol::Mqtt => "mqtt",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = match s.trim().to_lowercase().as_str() {
            "ssl" => "tls".to_string(),
            other => other.to_string(),
        };
        Protocol::ALL
            .into_iter()
            .find(|protocol| protocol.as_str() == wanted)
            .ok_or_else(|| RuleError::invalid_value("protocol", s))
    }
}

/// Traffic direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Source to destination (->)
    #[default]
    #[serde(rename = "->")]
    ToServer,
    /// Destination to source (<-)
    #[serde(rename = "<-")]
    ToClient,
    /// Bidirectional (<>)
    #[serde(rename = "<>")]
    Both,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToServer => write!(f, "->"),
            Direction::ToClient => write!(f, "<-"),
            Direction::Both => write!(f, "<>"),
        }
    }
}

impl FromStr for Direction {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "->" => Ok(Direction::ToServer),
            "<-" => Ok(Direction::ToClient),
            "<>" => Ok(Direction::Both),
            _ => Err(RuleError::invalid_value("direction", s)),
        }
    }
}

/// Header tuple of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleHeader {
    /// What to do on a match
    pub action: Action,
    /// Protocol keyword
    pub protocol: Protocol,
    /// Address, variable (`$HOME_NET`) or list
    pub source_ip: String,
    /// Port, variable or range
    pub source_port: String,
    /// `->`, `<-` or `<>`
    pub direction: Direction,
    /// Destination address
    pub dest_ip: String,
    /// Destination port
    pub dest_port: String,
}

impl Default for RuleHeader {
    fn default() -> Self {
        Self {
            action: Action::default(),
            protocol: Protocol::default(),
            source_ip: "any".to_string(),
            source_port: "any".to_string(),
            direction: Direction::default(),
            dest_ip: "any".to_string(),
            dest_port: "any".to_string(),
        }
    }
}

/// Normalize an address or port: blank means `any`, inner whitespace is dropped
pub(crate) fn endpoint(value: &str) -> String {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        "any".to_string()
    } else {
        compact
    }
}

impl fmt::Display for RuleHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.action,
            self.protocol,
            endpoint(&self.source_ip),
            endpoint(&self.source_port),
            self.direction,
            endpoint(&self.dest_ip),
            endpoint(&self.dest_port)
        )
    }
}
