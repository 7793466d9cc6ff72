//! `condition:` section

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quantifier over the rule's strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringMatch {
    /// No string clause
    #[default]
    None,
    /// `all of them`
    All,
    /// `any of them`
    Any,
}

/// File type recognised by its first two bytes, read little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PE executable, `MZ`
    Pe,
    /// ELF binary
    Elf,
    /// PDF document
    Pdf,
    /// ZIP archive
    Zip,
    /// gzip stream
    Gzip,
    /// RAR archive
    Rar,
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// OLE compound document
    Ole,
    /// Java class file
    Class,
    /// Any other 16-bit magic
    Custom(u16),
}

impl FileType {
    /// Named file types
    pub const KNOWN: [FileType; 11] = [
        FileType::Pe,
        FileType::Elf,
        FileType::Pdf,
        FileType::Zip,
        FileType::Gzip,
        FileType::Rar,
        FileType::Jpeg,
        FileType::Png,
        FileType::Gif,
        FileType::Ole,
        FileType::Class,
    ];

    /// Value of `uint16(0)` for files of this type
    pub fn magic(self) -> u16 {
        match self {
            FileType::Pe => 0x5A4D,
            FileType::Elf => 0x457F,
            FileType::Pdf => 0x5025,
            FileType::Zip => 0x4B50,
            FileType::Gzip => 0x8B1F,
            FileType::Rar => 0x6152,
            FileType::Jpeg => 0xD8FF,
            FileType::Png => 0x5089,
            FileType::Gif => 0x4947,
            FileType::Ole => 0xCFD0,
            FileType::Class => 0xFECA,
            FileType::Custom(magic) => magic,
        }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            FileType::Pe => "pe",
            FileType::Elf => "elf",
            FileType::Pdf => "pdf",
            FileType::Zip => "zip",
            FileType::Gzip => "gzip",
            FileType::Rar => "rar",
            FileType::Jpeg => "jpeg",
            FileType::Png => "png",
            FileType::Gif => "gif",
            FileType::Ole => "ole",
            FileType::Class => "class",
            FileType::Custom(_) => return None,
        })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:04X}", self.magic()),
        }
    }
}

impl FromStr for FileType {
    type Err = RuleError;

    /// Parse a type name (`pe`, `elf`, ...) or a `0x` prefixed magic
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if let Some(hex) = wanted.strip_prefix("0x") {
            return u16::from_str_radix(hex, 16)
                .map(FileType::Custom)
                .map_err(|_| RuleError::invalid_value("file type", s));
        }
        FileType::KNOWN
            .into_iter()
            .find(|kind| kind.name() == Some(wanted.as_str()))
            .ok_or_else(|| RuleError::invalid_value("file type", s))
    }
}

/// Structured condition of a rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YaraCondition {
    /// How many strings must match
    pub strings: StringMatch,
    /// Upper bound on file size in kilobytes
    pub filesize_kb: Option<u64>,
    /// Required file magic
    pub filetype: Option<FileType>,
}

impl YaraCondition {
    /// Clauses in emission order
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();
        match self.strings {
            StringMatch::All => clauses.push("all of them".to_string()),
            StringMatch::Any => clauses.push("any of them".to_string()),
            StringMatch::None => {}
        }
        if let Some(kb) = self.filesize_kb {
            clauses.push(format!("filesize < {kb}KB"));
        }
        if let Some(filetype) = self.filetype {
            clauses.push(format!("uint16(0) == 0x{:04X}", filetype.magic()));
        }
        clauses
    }

    /// The condition expression; `true` when no clause is set
    pub fn expression(&self) -> String {
        let clauses = self.clauses();
        if clauses.is_empty() {
            "true".to_string()
        } else {
            clauses.join(" and ")
        }
    }
}
