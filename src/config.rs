//! Defaults applied when builder sessions are created
//!
//! Loaded from YAML or JSON:
//!
//! ```yaml
//! sigma:
//!   authors: [Detection Team]
//!   status: experimental
//!   level: medium
//! snort:
//!   source_ip: $EXTERNAL_NET
//!   dest_ip: $HOME_NET
//!   classtype: trojan-activity
//! yara:
//!   author: Detection Team
//!   version: "1.0"
//! ```

use crate::error::{Result, RuleError};
use crate::sigma::{Level, Status};
use crate::snort::{Action, Classtype, Direction, Protocol};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Defaults for every rule kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Sigma rule defaults
    pub sigma: SigmaDefaults,
    /// Snort rule defaults
    pub snort: SnortDefaults,
    /// YARA rule defaults
    pub yara: YaraDefaults,
}

/// Defaults for new Sigma rules
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaDefaults {
    /// Seeds the `authors` list
    pub authors: Vec<String>,
    /// Initial status
    pub status: Status,
    /// Initial level
    pub level: Level,
    /// Initial license, blank for none
    pub license: String,
}

/// Defaults for new Snort rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnortDefaults {
    /// Header action
    pub action: Action,
    /// Header protocol
    pub protocol: Protocol,
    /// Source address
    #[serde(default = "default_endpoint")]
    pub source_ip: String,
    /// Source port
    #[serde(default = "default_endpoint")]
    pub source_port: String,
    /// Traffic direction
    pub direction: Direction,
    /// Destination address
    #[serde(default = "default_endpoint")]
    pub dest_ip: String,
    /// Destination port
    #[serde(default = "default_endpoint")]
    pub dest_port: String,
    /// Initial classtype, if any
    pub classtype: Option<Classtype>,
    /// Seeds the extended `policy` metadata
    pub policy: String,
}

/// Defaults for new YARA rules
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YaraDefaults {
    /// Initial `author` meta
    pub author: String,
    /// Initial `version` meta
    pub version: String,
}

fn default_endpoint() -> String {
    "any".to_string()
}

impl Default for SnortDefaults {
    fn default() -> Self {
        Self {
            action: Action::default(),
            protocol: Protocol::default(),
            source_ip: default_endpoint(),
            source_port: default_endpoint(),
            direction: Direction::default(),
            dest_ip: default_endpoint(),
            dest_port: default_endpoint(),
            classtype: None,
            policy: String::new(),
        }
    }
}

impl BuilderConfig {
    /// Load a `.yaml`/`.yml` or `.json` config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading builder config");
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let text = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(RuleError::Configuration(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Parse YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.sigma.authors.iter().any(|author| author.trim().is_empty()) {
            return Err(RuleError::Configuration(
                "sigma.authors cannot contain blank names".to_string(),
            ));
        }
        let endpoints = [
            ("snort.source_ip", &self.snort.source_ip),
            ("snort.source_port", &self.snort.source_port),
            ("snort.dest_ip", &self.snort.dest_ip),
            ("snort.dest_port", &self.snort.dest_port),
        ];
        for (name, value) in endpoints {
            if value.contains(|c: char| c == '(' || c == ')' || c == ';') {
                return Err(RuleError::Configuration(format!(
                    "{name} contains a reserved character: {value}"
                )));
            }
        }
        if self.snort.policy.contains(|c: char| c == ',' || c == ';' || c.is_control()) {
            return Err(RuleError::Configuration(format!(
                "snort.policy contains a reserved character: {}",
                self.snort.policy
            )));
        }
        Ok(())
    }
}
