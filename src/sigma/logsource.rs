//! Sigma `logsource` block

use serde::{Deserialize, Serialize};

/// Logsource represents the logsource block of a Sigma rule
/// It names the event stream the detection applies to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Product name (e.g., windows, linux)
    pub product: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Log category (e.g., process_creation, network_connection)
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Service name (e.g., sysmon, security)
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Custom definition for log source
    pub definition: Option<String>,
}

/// Addressable sub-keys of [`LogSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSourceField {
    /// `product`
    Product,
    /// `category`
    Category,
    /// `service`
    Service,
    /// `definition`
    Definition,
}

impl LogSource {
    /// Set a sub-key; blank values clear it
    pub fn set(&mut self, field: LogSourceField, value: &str) {
        let value = crate::rule::non_blank(value);
        match field {
            LogSourceField::Product => self.product = value,
            LogSourceField::Category => self.category = value,
            LogSourceField::Service => self.service = value,
            LogSourceField::Definition => self.definition = value,
        }
    }

    /// Present sub-keys in emission order
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("product", &self.product),
            ("category", &self.category),
            ("service", &self.service),
            ("definition", &self.definition),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }
}
