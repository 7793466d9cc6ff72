//! Payload detection options: content, pcre, flowbits, rate limiting

use crate::error::RuleError;
use crate::rule::{Entry, NamedList};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Modifier attached to a content match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentModifier {
    /// Case insensitive matching
    Nocase,
    /// Match on raw bytes (not normalized)
    Rawbytes,
    /// Use for fast pre-filtering
    FastPattern,
    /// Maximum depth to search
    Depth(u32),
    /// Absolute offset from start of payload
    Offset(u32),
    /// Relative distance from last match
    Distance(i32),
    /// Must match within N bytes of last match
    Within(u32),
    /// Buffer size constraint, e.g. `10` or `<20` or `5<>15`
    Bsize(String),
    /// `http_uri` sticky buffer
    HttpUri,
    /// `http_raw_uri` sticky buffer
    HttpRawUri,
    /// `http_header` sticky buffer
    HttpHeader,
    /// `http_raw_header` sticky buffer
    HttpRawHeader,
    /// `http_method` sticky buffer
    HttpMethod,
    /// `http_cookie` sticky buffer
    HttpCookie,
    /// `http_client_body` sticky buffer
    HttpClientBody,
    /// `http_server_body` sticky buffer
    HttpServerBody,
    /// `http_stat_code` sticky buffer
    HttpStatCode,
    /// `http_stat_msg` sticky buffer
    HttpStatMsg,
    /// `http_user_agent` sticky buffer
    HttpUserAgent,
    /// `http_host` sticky buffer
    HttpHost,
}

impl ContentModifier {
    /// Modifiers that take no argument
    pub const FLAGS: [ContentModifier; 15] = [
        ContentModifier::Nocase,
        ContentModifier::Rawbytes,
        ContentModifier::FastPattern,
        ContentModifier::HttpUri,
        ContentModifier::HttpRawUri,
        ContentModifier::HttpHeader,
        ContentModifier::HttpRawHeader,
        ContentModifier::HttpMethod,
        ContentModifier::HttpCookie,
        ContentModifier::HttpClientBody,
        ContentModifier::HttpServerBody,
        ContentModifier::HttpStatCode,
        ContentModifier::HttpStatMsg,
        ContentModifier::HttpUserAgent,
        ContentModifier::HttpHost,
    ];

    fn keyword(&self) -> &'static str {
        match self {
            ContentModifier::Nocase => "nocase",
            ContentModifier::Rawbytes => "rawbytes",
            ContentModifier::FastPattern => "fast_pattern",
            ContentModifier::Depth(_) => "depth",
            ContentModifier::Offset(_) => "offset",
            ContentModifier::Distance(_) => "distance",
            ContentModifier::Within(_) => "within",
            ContentModifier::Bsize(_) => "bsize",
            ContentModifier::HttpUri => "http_uri",
            ContentModifier::HttpRawUri => "http_raw_uri",
            ContentModifier::HttpHeader => "http_header",
            ContentModifier::HttpRawHeader => "http_raw_header",
            ContentModifier::HttpMethod => "http_method",
            ContentModifier::HttpCookie => "http_cookie",
            ContentModifier::HttpClientBody => "http_client_body",
            ContentModifier::HttpServerBody => "http_server_body",
            ContentModifier::HttpStatCode => "http_stat_code",
            ContentModifier::HttpStatMsg => "http_stat_msg",
            ContentModifier::HttpUserAgent => "http_user_agent",
            ContentModifier::HttpHost => "http_host",
        }
    }
}

impl fmt::Display for ContentModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentModifier::Depth(n) | ContentModifier::Offset(n) | ContentModifier::Within(n) => {
                write!(f, "{}:{}", self.keyword(), n)
            }
            ContentModifier::Distance(n) => write!(f, "distance:{n}"),
            ContentModifier::Bsize(spec) => write!(f, "bsize:{}", spec.trim()),
            flag => f.write_str(flag.keyword()),
        }
    }
}

impl FromStr for ContentModifier {
    type Err = RuleError;

    /// Parse `nocase`, `depth:4`, `bsize:<20` and similar
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RuleError::invalid_value("content modifier", s);
        let (keyword, argument) = match s.trim().split_once(':') {
            Some((keyword, argument)) => (keyword.trim().to_lowercase(), Some(argument.trim())),
            None => (s.trim().to_lowercase(), None),
        };

        match (keyword.as_str(), argument) {
            ("depth", Some(n)) => n.parse().map(ContentModifier::Depth).map_err(|_| invalid()),
            ("offset", Some(n)) => n.parse().map(ContentModifier::Offset).map_err(|_| invalid()),
            ("distance", Some(n)) => n.parse().map(ContentModifier::Distance).map_err(|_| invalid()),
            ("within", Some(n)) => n.parse().map(ContentModifier::Within).map_err(|_| invalid()),
            ("bsize", Some(spec)) if !spec.is_empty() => Ok(ContentModifier::Bsize(spec.to_string())),
            (keyword, None) => ContentModifier::FLAGS
                .into_iter()
                .find(|flag| flag.keyword() == keyword)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

/// Modifiers are unique by keyword: a content match has at most one `depth`
impl Entry for ContentModifier {
    fn same_as(&self, other: &Self) -> bool {
        self.keyword() == other.keyword()
    }
}

/// A `content` match with its modifiers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentMatch {
    /// Pattern text; `|41 42|` hex blocks pass through untouched
    pub value: String,
    /// Negated match (`content:!"..."`)
    pub negated: bool,
    /// Attached modifiers, in emission order
    pub modifiers: NamedList<ContentModifier>,
}

impl ContentMatch {
    /// Content match without modifiers
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// Attach a modifier, builder style
    pub fn with(mut self, modifier: ContentModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.value.is_empty() {
            return Err("content value is empty".to_string());
        }
        if self.value.matches('|').count() % 2 != 0 {
            return Err(format!("content '{}' has an unterminated hex block", self.value));
        }
        check_text("content", &self.value, &[])
    }

    /// `content:"value"; modifier; modifier`
    pub fn clause(&self) -> String {
        let mut parts = vec![format!(
            "content:{}\"{}\"",
            if self.negated { "!" } else { "" },
            escape(&self.value)
        )];
        parts.extend(self.modifiers.iter().map(ToString::to_string));
        parts.join("; ")
    }
}

impl Entry for ContentMatch {}

/// A `pcre` option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcreMatch {
    /// Pattern including delimiters and flags, e.g. `/evil\d+/i`
    pub pattern: String,
}

impl PcreMatch {
    /// Create a pcre option
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        let pattern = self.pattern.trim().trim_start_matches('!');
        if !pattern.starts_with('/') || pattern.len() < 2 || !pattern[1..].contains('/') {
            return Err(format!("pcre '{}' must be written as /pattern/flags", self.pattern));
        }
        check_text("pcre", &self.pattern, &[])
    }

    /// `pcre:"pattern"`
    pub fn clause(&self) -> String {
        let pattern = self.pattern.trim().replace('"', "\\\"").replace(';', "\\;");
        format!("pcre:\"{pattern}\"")
    }
}

impl Entry for PcreMatch {}

/// Flowbits operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowbitAction {
    /// Set the bit
    Set,
    /// Match when the bit is set
    IsSet,
    /// Match when the bit is not set
    IsNotSet,
    /// Flip the bit
    Toggle,
    /// Clear the bit
    Unset,
    /// Set one bit of a group
    SetX,
    /// Match when any bit of a group is set
    IsSetX,
    /// Flip one bit of a group
    ToggleX,
    /// Clear one bit of a group
    UnsetX,
}

impl FlowbitAction {
    /// Every flowbit action
    pub const ALL: [FlowbitAction; 9] = [
        FlowbitAction::Set,
        FlowbitAction::IsSet,
        FlowbitAction::IsNotSet,
        FlowbitAction::Toggle,
        FlowbitAction::Unset,
        FlowbitAction::SetX,
        FlowbitAction::IsSetX,
        FlowbitAction::ToggleX,
        FlowbitAction::UnsetX,
    ];

    /// Keyword as written in the rule
    pub fn as_str(self) -> &'static str {
        match self {
            FlowbitAction::Set => "set",
            FlowbitAction::IsSet => "isset",
            FlowbitAction::IsNotSet => "isnotset",
            FlowbitAction::Toggle => "toggle",
            FlowbitAction::Unset => "unset",
            FlowbitAction::SetX => "setx",
            FlowbitAction::IsSetX => "issetx",
            FlowbitAction::ToggleX => "togglex",
            FlowbitAction::UnsetX => "unsetx",
        }
    }
}

impl fmt::Display for FlowbitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowbitAction {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FlowbitAction::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| RuleError::invalid_value("flowbit action", s))
    }
}

/// A `flowbits` option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flowbit {
    /// Operation on the bit
    pub action: FlowbitAction,
    /// Flag name; `&` and `|` combine several names
    pub name: String,
}

impl Flowbit {
    /// Create a flowbit option
    pub fn new(action: FlowbitAction, name: impl Into<String>) -> Self {
        Self {
            action,
            name: name.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("flowbit name is empty".to_string());
        }
        if name.contains(|c: char| c == ',' || c == ';' || c == '"' || c.is_whitespace()) {
            return Err(format!("flowbit name '{name}' contains a separator"));
        }
        Ok(())
    }

    /// `flowbits:<action>,<name>`
    pub fn clause(&self) -> String {
        format!("flowbits:{},{}", self.action, self.name.trim())
    }
}

impl Entry for Flowbit {}

/// Payload detection block of a rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleContent {
    /// `content` matches in emission order
    pub content: NamedList<ContentMatch>,
    /// `pcre` matches
    pub pcre: NamedList<PcreMatch>,
    /// `flowbits` operations
    pub flowbits: NamedList<Flowbit>,
    /// Free text threshold spec, e.g. `type limit, track by_src, count 1, seconds 60`
    pub threshold: String,
    /// Free text detection filter, e.g. `track by_src, count 5, seconds 60`
    pub detection_filter: String,
}

/// Characters that end an option clause
pub(crate) const CLAUSE_END: &[char] = &[';'];

/// Characters that end a clause or an entry of a comma separated option
pub(crate) const LIST_SEPARATORS: &[char] = &[';', ','];

/// Refuse control characters, and any `reserved` character, in an option value
///
/// A rule is a single line, so a newline anywhere splits it.
pub(crate) fn check_text(what: &str, value: &str, reserved: &[char]) -> Result<(), String> {
    if value.chars().any(char::is_control) {
        return Err(format!("{what} contains a control character"));
    }
    if let Some(c) = value.chars().find(|c| reserved.contains(c)) {
        return Err(format!("{what} '{value}' contains reserved '{c}'"));
    }
    Ok(())
}

/// Escape the characters the rule language reserves inside quoted values
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
