//! Rule authoring and serialization for Sigma, Snort/Suricata and YARA
//!
//! Each rule language has a structured draft type that is edited through
//! explicit commands and rendered into the exact text the target engine
//! expects. Rendering is deterministic: identifiers and dates are only
//! generated when a session is created or reset.
//!
//! # Example
//!
//! ```
//! use rulecraft::rule::{ListOp, RuleKind};
//! use rulecraft::session::{create_session, mutate, serialize, Command};
//! use rulecraft::yara::{StringDef, StringMatch, StringType, YaraCommand};
//!
//! let commands = vec![
//!     YaraCommand::SetRuleName("Test Rule".to_string()),
//!     YaraCommand::Strings(ListOp::Add(StringDef::new("a", StringType::Text, "evil"))),
//!     YaraCommand::SetStringMatch(StringMatch::All),
//! ];
//!
//! let session = commands
//!     .into_iter()
//!     .fold(create_session(RuleKind::Yara), |session, command| {
//!         mutate(session, Command::Yara(command)).state
//!     });
//!
//! let text = serialize(&session).unwrap();
//! assert!(text.starts_with("rule Test_Rule {"));
//! assert!(text.ends_with("  condition:\n    all of them\n}"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Re-export commonly used items
pub use config::BuilderConfig;
pub use error::{Result, RuleError, ValidationError};
pub use ident::Ledger;
pub use rule::{Applied, ListOp, NamedList, Outcome, RuleDraft, RuleKind};
pub use ruleset::RuleSet;
pub use session::{
    create_session, create_session_with, export, mutate, reset_session, serialize, validate,
    Command, Draft, Export, Session,
};
pub use validate::Validation;

/// Error types
pub mod error;

/// Identifier and date generation
pub mod ident;

/// Shared rule model: kinds, ordered lists, conditions, commands
pub mod rule;

/// Required-field checks
pub mod validate;

/// Sigma rules
pub mod sigma;

/// Snort/Suricata rules
pub mod snort;

/// YARA rules
pub mod yara;

/// Builder sessions
pub mod session;

/// Bundles of finished rules
pub mod ruleset;

/// Session defaults loaded from YAML or JSON
pub mod config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber with default settings
///
/// Filters come from `RUST_LOG`; output is JSON.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

/// Initialize tracing with an explicit level, as plain text or JSON
///
/// `RUST_LOG` still wins when it is set. Calling this twice is harmless.
pub fn init_tracing_with(json: bool, level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rulecraft={level}")));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}
