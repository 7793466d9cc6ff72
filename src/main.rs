//! Command-line interface for rulecraft
//!
//! Sessions are stored as JSON files so a rule can be built up over several
//! invocations: `new` writes a fresh session, `apply` edits it, `render`
//! prints or exports the rule text.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rulecraft::{
    create_session_with, export, init_tracing_with, mutate, serialize, validate, BuilderConfig,
    Command, Outcome, RuleKind, RuleSet, Session,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Author Sigma, Snort/Suricata and YARA rules from structured sessions
#[derive(Parser, Debug)]
#[command(name = "rulecraft")]
#[command(version = rulecraft::VERSION)]
#[command(about = "Structured authoring of Sigma, Snort/Suricata and YARA rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Action,

    /// Enable JSON structured logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Start a new session with fresh identifiers
    New {
        /// Rule kind: sigma, snort (or suricata) or yara
        kind: RuleKind,

        /// Defaults file (YAML, or JSON by extension)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write the session here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Apply a JSON command to a session file in place
    Apply {
        /// Session file
        session: PathBuf,

        /// Command as JSON, e.g. '{"snort":{"set_msg":"Test"}}'; `-` reads stdin
        command: String,
    },

    /// Check required fields
    Validate {
        /// Session file
        session: PathBuf,
    },

    /// Print the rule text
    Render {
        /// Session file
        session: PathBuf,

        /// Write `<export name>` under this directory instead of printing
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },

    /// Combine every session in a directory into one file per rule kind
    Bundle {
        /// Directory of session files
        dir: PathBuf,

        /// Base name of the combined files
        #[arg(long, default_value = "rules")]
        stem: String,

        /// Write the combined files here instead of printing
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,

        /// Stop at the first session that cannot be loaded or rendered
        #[arg(long)]
        fail_on_error: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_with(cli.json_logs, &cli.log_level);

    match cli.command {
        Action::New {
            kind,
            config,
            output,
        } => new_session(kind, config.as_deref(), output.as_deref()),
        Action::Apply { session, command } => apply_command(&session, &command),
        Action::Validate { session } => validate_session(&session),
        Action::Render { session, export } => render_session(&session, export.as_deref()),
        Action::Bundle {
            dir,
            stem,
            export,
            fail_on_error,
        } => bundle(&dir, &stem, export.as_deref(), fail_on_error),
    }
}

fn load_session(path: &Path) -> Result<Session> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid session file {}", path.display()))
}

fn save_session(session: &Session, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    match path {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write session {}", path.display()))?;
            debug!("Wrote session to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn new_session(kind: RuleKind, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let defaults = match config {
        Some(path) => BuilderConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BuilderConfig::default(),
    };
    let session = create_session_with(kind, &defaults);
    info!(%kind, "Started new session");
    save_session(&session, output)
}

fn apply_command(path: &Path, command: &str) -> Result<()> {
    let command = if command == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        command.to_string()
    };
    let command: Command = serde_json::from_str(&command).context("Invalid command")?;

    let session = load_session(path)?;
    let applied = mutate(session, command);
    match &applied.outcome {
        Outcome::Applied => {
            save_session(&applied.state, Some(path))?;
            println!("{}", applied.outcome);
            Ok(())
        }
        Outcome::Duplicate => {
            warn!("Entry already exists, session unchanged");
            println!("{}", applied.outcome);
            Ok(())
        }
        outcome => bail!("{outcome}"),
    }
}

fn validate_session(path: &Path) -> Result<()> {
    let session = load_session(path)?;
    let validation = validate(&session);
    if validation.is_ok() {
        println!("{} rule is valid", session.kind());
        return Ok(());
    }
    for violation in validation.violations() {
        eprintln!("  - {violation}");
    }
    bail!(
        "{} rule has {} violation(s)",
        session.kind(),
        validation.violations().len()
    )
}

fn render_session(path: &Path, dir: Option<&Path>) -> Result<()> {
    let session = load_session(path)?;
    match dir {
        Some(dir) => {
            let file = export(&session)?;
            let written = file
                .write_to(dir)
                .with_context(|| format!("Failed to export into {}", dir.display()))?;
            println!("{}", written.display());
        }
        None => println!("{}", serialize(&session)?),
    }
    Ok(())
}

fn bundle(dir: &Path, stem: &str, export_dir: Option<&Path>, fail_on_error: bool) -> Result<()> {
    let mut set = RuleSet::new();
    set.load_directory(dir, fail_on_error)
        .with_context(|| format!("Failed to load sessions from {}", dir.display()))?;
    if set.is_empty() {
        warn!("No rules found in {}", dir.display());
        return Ok(());
    }

    for file in set.exports(stem) {
        match export_dir {
            Some(target) => println!("{}", file.write_to(target)?.display()),
            None => print!("{}", file.contents),
        }
    }
    Ok(())
}
