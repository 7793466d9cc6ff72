//! `strings:` section entries

use crate::error::RuleError;
use crate::rule::Entry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid regex pattern"));

static HEX_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f?\s\[\]\-()|~]+$").expect("Invalid regex pattern"));

/// Whether `value` is usable as a string or rule identifier
pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

/// How a string value is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringType {
    /// `"text"`
    #[default]
    Text,
    /// `{ 4D 5A }`
    Hex,
    /// `/pattern/`
    Regex,
    /// `"text" wide`
    Wide,
}

impl FromStr for StringType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(StringType::Text),
            "hex" => Ok(StringType::Hex),
            "regex" => Ok(StringType::Regex),
            "wide" => Ok(StringType::Wide),
            _ => Err(RuleError::invalid_value("string type", s)),
        }
    }
}

/// String modifier; ordering is emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringModifier {
    /// `nocase`
    Nocase,
    /// `ascii`
    Ascii,
    /// `wide`
    Wide,
    /// `fullword`
    Fullword,
}

impl StringModifier {
    /// Keyword as written in a rule
    pub fn as_str(self) -> &'static str {
        match self {
            StringModifier::Nocase => "nocase",
            StringModifier::Ascii => "ascii",
            StringModifier::Wide => "wide",
            StringModifier::Fullword => "fullword",
        }
    }
}

impl fmt::Display for StringModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StringModifier {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nocase" => Ok(StringModifier::Nocase),
            "ascii" => Ok(StringModifier::Ascii),
            "wide" => Ok(StringModifier::Wide),
            "fullword" => Ok(StringModifier::Fullword),
            _ => Err(RuleError::invalid_value("string modifier", s)),
        }
    }
}

/// One `$id = value modifiers` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringDef {
    /// Identifier without the leading `$`
    pub identifier: String,
    /// Text, hex or regex
    #[serde(rename = "type", default)]
    pub kind: StringType,
    /// Literal text, hex bytes or regex body
    pub value: String,
    #[serde(default)]
    pub modifiers: BTreeSet<StringModifier>,
}

impl StringDef {
    /// Create a string definition without modifiers
    pub fn new(identifier: impl Into<String>, kind: StringType, value: impl Into<String>) -> Self {
        let identifier: String = identifier.into();
        Self {
            identifier: identifier.trim().trim_start_matches('$').to_string(),
            kind,
            value: value.into(),
            modifiers: BTreeSet::new(),
        }
    }

    /// Add a modifier, builder style
    pub fn with(mut self, modifier: StringModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if !is_identifier(&self.identifier) {
            return Err(format!(
                "string identifier '{}' must match [A-Za-z0-9_]+",
                self.identifier
            ));
        }
        if self.value.trim().is_empty() {
            return Err(format!("string ${} has no value", self.identifier));
        }
        if self.kind == StringType::Hex && !HEX_BODY.is_match(self.value.trim()) {
            return Err(format!("string ${} is not a hex pattern", self.identifier));
        }
        Ok(())
    }

    /// Modifiers as emitted, including the implied `wide` of wide strings
    pub fn effective_modifiers(&self) -> BTreeSet<StringModifier> {
        let mut modifiers = self.modifiers.clone();
        if self.kind == StringType::Wide {
            modifiers.insert(StringModifier::Wide);
        }
        modifiers
    }

    /// The delimited value
    pub fn delimited(&self) -> String {
        match self.kind {
            StringType::Text | StringType::Wide => format!("\"{}\"", escape(&self.value)),
            StringType::Hex => format!("{{ {} }}", self.value.trim()),
            StringType::Regex => format!("/{}/", escape_slashes(self.value.trim())),
        }
    }
}

impl fmt::Display for StringDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} = {}", self.identifier, self.delimited())?;
        for modifier in self.effective_modifiers() {
            write!(f, " {modifier}")?;
        }
        Ok(())
    }
}

/// Identifiers are unique within a rule
impl Entry for StringDef {
    fn same_as(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

/// Escape a text string value
///
/// Control characters become `\n`, `\r`, `\t` or `\xNN` so the literal stays on one line.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => push_control(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

fn push_control(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c => {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("\\x{byte:02x}"));
            }
        }
    }
}

fn escape_slashes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    for c in pattern.chars() {
        if c.is_control() {
            push_control(&mut out, c);
            escaped = false;
            continue;
        }
        if c == '/' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}
