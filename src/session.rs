//! Builder sessions
//!
//! A session owns the draft of one rule plus the identifiers it has been
//! handed. All edits go through [`mutate`], which consumes the session and
//! returns the next one together with an [`Outcome`]. Sessions share nothing,
//! so independent sessions can live on different threads.
//!
//! # Example
//!
//! ```
//! use rulecraft::rule::RuleKind;
//! use rulecraft::session::{create_session, export, mutate, validate, Command};
//! use rulecraft::snort::SnortCommand;
//!
//! let session = create_session(RuleKind::Snort);
//! assert!(!validate(&session).is_ok());
//!
//! let applied = mutate(session, Command::Snort(SnortCommand::SetMsg("Test".to_string())));
//! assert!(applied.outcome.is_applied());
//!
//! let file = export(&applied.state).unwrap();
//! assert!(file.file_name.starts_with("snort_rule_"));
//! assert!(file.contents.ends_with(")\n"));
//! ```

use crate::config::BuilderConfig;
use crate::error::Result;
use crate::ident::{self, Ledger};
use crate::rule::{Applied, Outcome, RuleDraft, RuleKind};
use crate::sigma::{SigmaCommand, SigmaRule};
use crate::snort::{SnortCommand, SnortRule};
use crate::validate::Validation;
use crate::yara::{YaraCommand, YaraRule};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rule under construction, tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rule", rename_all = "lowercase")]
pub enum Draft {
    /// A Sigma rule
    Sigma(SigmaRule),
    /// A Snort/Suricata rule
    Snort(SnortRule),
    /// A YARA rule
    Yara(YaraRule),
}

impl Draft {
    /// Kind of the contained rule
    pub fn kind(&self) -> RuleKind {
        match self {
            Draft::Sigma(_) => RuleKind::Sigma,
            Draft::Snort(_) => RuleKind::Snort,
            Draft::Yara(_) => RuleKind::Yara,
        }
    }

    /// Run the required-field checks
    pub fn validate(&self) -> Validation {
        match self {
            Draft::Sigma(rule) => rule.validate(),
            Draft::Snort(rule) => rule.validate(),
            Draft::Yara(rule) => rule.validate(),
        }
    }

    /// Render the rule text
    pub fn render(&self) -> Result<String> {
        match self {
            Draft::Sigma(rule) => rule.render(),
            Draft::Snort(rule) => rule.render(),
            Draft::Yara(rule) => rule.render(),
        }
    }

    /// File name the rule is exported under
    pub fn export_name(&self) -> String {
        match self {
            Draft::Sigma(rule) => rule.export_name(),
            Draft::Snort(rule) => rule.export_name(),
            Draft::Yara(rule) => rule.export_name(),
        }
    }
}

/// An edit addressed to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Edit a Sigma draft
    Sigma(SigmaCommand),
    /// Edit a Snort draft
    Snort(SnortCommand),
    /// Edit a YARA draft
    Yara(YaraCommand),
    /// Replace the Sigma id or Snort sid with a fresh one
    RegenerateIdentifier,
}

impl Command {
    fn kind(&self) -> Option<RuleKind> {
        match self {
            Command::Sigma(_) => Some(RuleKind::Sigma),
            Command::Snort(_) => Some(RuleKind::Snort),
            Command::Yara(_) => Some(RuleKind::Yara),
            Command::RegenerateIdentifier => None,
        }
    }
}

/// Rendered rule ready to hand to a download sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Suggested file name
    pub file_name: String,
    /// Rule text, newline terminated
    pub contents: String,
}

impl Export {
    /// Write the contents under `dir`, returning the full path
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// One builder session
///
/// Serializes as the tagged draft plus the defaults a reset falls back to.
/// The ledger is rebuilt from the draft's identifiers on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SavedSession", into = "SavedSession")]
pub struct Session {
    draft: Draft,
    ledger: Ledger,
    defaults: BuilderConfig,
}

/// Wire form of a [`Session`]
#[derive(Serialize, Deserialize)]
struct SavedSession {
    #[serde(flatten)]
    draft: Draft,
    #[serde(default)]
    defaults: BuilderConfig,
}

impl From<SavedSession> for Session {
    fn from(saved: SavedSession) -> Self {
        Session::from(saved.draft).with_defaults(saved.defaults)
    }
}

impl From<Session> for SavedSession {
    fn from(session: Session) -> Self {
        SavedSession {
            draft: session.draft,
            defaults: session.defaults,
        }
    }
}

impl From<Draft> for Session {
    /// Resume a session from a saved draft with built-in defaults; its
    /// identifiers seed the ledger
    fn from(draft: Draft) -> Self {
        let mut ledger = Ledger::new();
        match &draft {
            Draft::Sigma(rule) if !rule.metadata.id.is_empty() => {
                ledger.record_uuid(rule.metadata.id.clone())
            }
            Draft::Snort(rule) => {
                if let Some(sid) = rule.sid() {
                    ledger.record_sid(sid);
                }
            }
            _ => {}
        }
        Self {
            draft,
            ledger,
            defaults: BuilderConfig::default(),
        }
    }
}

impl From<Session> for Draft {
    fn from(session: Session) -> Self {
        session.draft
    }
}

impl Session {
    /// Kind of rule being built
    pub fn kind(&self) -> RuleKind {
        self.draft.kind()
    }

    /// Current draft
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Identifiers handed to this session
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Defaults applied on creation and reset
    pub fn defaults(&self) -> &BuilderConfig {
        &self.defaults
    }

    /// Replace the defaults used by the next reset
    pub fn with_defaults(mut self, defaults: BuilderConfig) -> Self {
        self.defaults = defaults;
        self
    }

    fn fresh_draft(kind: RuleKind, ledger: &mut Ledger, defaults: &BuilderConfig) -> Draft {
        match kind {
            RuleKind::Sigma => Draft::Sigma(SigmaRule::with_defaults(
                ledger.fresh_uuid(),
                ident::today(),
                &defaults.sigma,
            )),
            RuleKind::Snort => Draft::Snort(SnortRule::with_defaults(
                ledger.fresh_sid(),
                ident::today(),
                &defaults.snort,
            )),
            RuleKind::Yara => Draft::Yara(YaraRule::with_defaults(&defaults.yara)),
        }
    }

    fn regenerate(&mut self) -> Outcome {
        match &mut self.draft {
            Draft::Sigma(rule) => {
                rule.metadata.id = self.ledger.fresh_uuid();
                debug!(id = %rule.metadata.id, "Regenerated sigma id");
                Outcome::Applied
            }
            Draft::Snort(rule) => {
                let sid = self.ledger.fresh_sid();
                rule.options.sid = Some(sid);
                debug!(sid, "Regenerated snort sid");
                Outcome::Applied
            }
            Draft::Yara(_) => Outcome::rejected("yara rules have no generated identifier"),
        }
    }
}

/// Start a session with built-in defaults
pub fn create_session(kind: RuleKind) -> Session {
    create_session_with(kind, &BuilderConfig::default())
}

/// Start a session with configured defaults
pub fn create_session_with(kind: RuleKind, defaults: &BuilderConfig) -> Session {
    let mut ledger = Ledger::new();
    let draft = Session::fresh_draft(kind, &mut ledger, defaults);
    info!(%kind, "Created builder session");
    Session {
        draft,
        ledger,
        defaults: defaults.clone(),
    }
}

/// Apply one command
///
/// Commands for another rule kind are rejected and leave the session as it was.
pub fn mutate(mut session: Session, command: Command) -> Applied<Session> {
    let kind = session.kind();
    if let Some(target) = command.kind() {
        if target != kind {
            warn!(%kind, %target, "Command addressed to another rule kind");
            return Applied::new(
                session,
                Outcome::rejected(format!("{target} command sent to a {kind} session")),
            );
        }
    }

    let Session {
        draft,
        mut ledger,
        defaults,
    } = session;

    let applied = match (draft, command) {
        (Draft::Sigma(rule), Command::Sigma(command)) => {
            let applied = rule.apply(command);
            if applied.outcome.is_applied() {
                ledger.record_uuid(applied.state.metadata.id.clone());
            }
            applied.map(Draft::Sigma)
        }
        (Draft::Snort(rule), Command::Snort(command)) => {
            let applied = rule.apply(command);
            if let Some(sid) = applied.state.sid() {
                ledger.record_sid(sid);
            }
            applied.map(Draft::Snort)
        }
        (Draft::Yara(rule), Command::Yara(command)) => rule.apply(command).map(Draft::Yara),
        (draft, _) => {
            session = Session {
                draft,
                ledger,
                defaults,
            };
            let outcome = session.regenerate();
            return Applied::new(session, outcome);
        }
    };

    match &applied.outcome {
        Outcome::Applied => debug!(%kind, "Command applied"),
        outcome => warn!(%kind, %outcome, "Command not applied"),
    }
    applied.map(|draft| Session {
        draft,
        ledger,
        defaults,
    })
}

/// Run the required-field checks
pub fn validate(session: &Session) -> Validation {
    session.draft.validate()
}

/// Render the rule text, failing when required fields are missing
pub fn serialize(session: &Session) -> Result<String> {
    let validation = validate(session);
    if !validation.is_ok() {
        warn!(
            kind = %session.kind(),
            violations = ?validation.violations(),
            "Refusing to serialize incomplete rule"
        );
    }
    session.draft.render()
}

/// Discard the draft and start over with fresh identifiers
///
/// The ledger survives, so a reset never reissues an identifier.
pub fn reset_session(session: Session) -> Session {
    let Session {
        draft,
        mut ledger,
        defaults,
    } = session;
    let kind = draft.kind();
    let draft = Session::fresh_draft(kind, &mut ledger, &defaults);
    info!(%kind, "Reset builder session");
    Session {
        draft,
        ledger,
        defaults,
    }
}

/// Render the rule and name the file it belongs in
pub fn export(session: &Session) -> Result<Export> {
    let contents = serialize(session)?;
    Ok(Export {
        file_name: session.draft.export_name(),
        contents: format!("{contents}\n"),
    })
}
