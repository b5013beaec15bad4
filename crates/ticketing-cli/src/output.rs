//! How `tkt` writes results: pretty sections for terminals, tab-separated
//! rows for pipes, JSON for scripts.
//!
//! The mode comes from the first source that names a known mode:
//! `--format`, the hidden `--json` switch, `FORMAT`, then `output` in the
//! user config. With none of those, a terminal gets pretty output and a
//! pipe gets text.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use crate::scenario::StepError;

/// Width of the dashed rule under pretty section headings.
pub const RULE_WIDTH: usize = 72;

/// Heading line plus a dashed rule.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    rule(w)
}

pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

/// `label:` padded to a fixed column, then the value.
pub fn field(w: &mut dyn Write, label: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{label}:");
    writeln!(w, "{label:<12} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sectioned report for a terminal.
    Pretty,
    /// One tab-separated row per fact.
    Text,
    /// The serialized report.
    Json,
}

impl OutputMode {
    fn from_setting(raw: &str) -> Option<Self> {
        Self::from_str(raw.trim(), true).ok()
    }
}

fn pick_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    settings: &[Option<&str>],
    is_tty: bool,
) -> OutputMode {
    let forced_json = json_flag.then_some(OutputMode::Json);
    format_flag
        .or(forced_json)
        .or_else(|| {
            settings
                .iter()
                .flatten()
                .find_map(|raw| OutputMode::from_setting(raw))
        })
        .unwrap_or(if is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Pick the output mode for this invocation.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_output: Option<&str>,
) -> OutputMode {
    let format_env = std::env::var("FORMAT").ok();
    pick_mode(
        format_flag,
        json_flag,
        &[format_env.as_deref(), user_output],
        io::stdout().is_terminal(),
    )
}

/// A command result that can be shown in every [`OutputMode`].
pub trait Render: Serialize {
    fn text(&self, w: &mut dyn Write) -> io::Result<()>;
    fn pretty(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Write `report` to `w` in `mode`.
pub fn write_report<R: Render>(
    w: &mut dyn Write,
    mode: OutputMode,
    report: &R,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *w, report)?;
            writeln!(w)?;
        }
        OutputMode::Text => report.text(w)?,
        OutputMode::Pretty => report.pretty(w)?,
    }
    Ok(())
}

/// Write `report` to stdout in `mode`.
pub fn emit<R: Render>(mode: OutputMode, report: &R) -> anyhow::Result<()> {
    let stdout = io::stdout();
    write_report(&mut stdout.lock(), mode, report)
}

/// Failure shown on stderr: a tracker error code (`E3005`) or a CLI-level
/// code such as `scenario_invalid`.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorReport {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    fn write_to(&self, w: &mut dyn Write, mode: OutputMode) -> anyhow::Result<()> {
        if mode == OutputMode::Json {
            serde_json::to_writer_pretty(&mut *w, &serde_json::json!({ "error": self }))?;
            writeln!(w)?;
            return Ok(());
        }
        writeln!(w, "error[{}]: {}", self.code, self.message)?;
        if let Some(hint) = &self.hint {
            writeln!(w, "  hint: {hint}")?;
        }
        Ok(())
    }

    /// Write to stderr in `mode`.
    pub fn report(&self, mode: OutputMode) -> anyhow::Result<()> {
        let stderr = io::stderr();
        self.write_to(&mut stderr.lock(), mode)
    }
}

impl From<&StepError> for ErrorReport {
    fn from(err: &StepError) -> Self {
        Self {
            code: err.error_code.clone(),
            message: err.message.clone(),
            hint: err.hint.clone(),
        }
    }
}
