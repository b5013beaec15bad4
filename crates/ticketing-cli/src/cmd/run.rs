//! `tkt run` and `tkt demo`: execute a scenario against a fresh tracker and
//! report the resulting state.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use ticketing_core::report::TrackerSummary;
use ticketing_core::{IssueManager, IssuePolicy, Severity};
use tracing::info;

use crate::output::{ErrorReport, OutputMode, Render, emit, field, rule, section};
use crate::scenario::{self, Outcome, Scenario};

/// Arguments for `tkt run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (TOML) to execute.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Continue after a failing entry instead of stopping.
    #[arg(long)]
    pub keep_going: bool,
}

/// Arguments for `tkt demo`.
#[derive(Args, Debug, Default)]
pub struct DemoArgs {}

/// Report payload for `tkt run` and `tkt demo`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub ok: bool,
    pub outcomes: Vec<Outcome>,
    pub summary: TrackerSummary,
}

/// Execute `tkt run`.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or any entry fails.
pub fn run_scenario_file(
    args: &RunArgs,
    policy: IssuePolicy,
    output: OutputMode,
) -> anyhow::Result<()> {
    let scenario = match scenario::load(&args.file) {
        Ok(scenario) => scenario,
        Err(e) => {
            ErrorReport::new(
                "scenario_invalid",
                format!("{e:#}"),
                "Scenarios hold [[users]], [[components]] and [[steps]] tables only",
            )
            .report(output)?;
            return Err(e);
        }
    };
    execute(&scenario, policy, args.keep_going, output, &args.file)
}

/// Execute `tkt demo`.
///
/// # Errors
///
/// Returns an error if any demo entry fails (for example under a stricter policy).
pub fn run_demo(_args: &DemoArgs, policy: IssuePolicy, output: OutputMode) -> anyhow::Result<()> {
    execute(&scenario::demo(), policy, false, output, Path::new("<demo>"))
}

fn execute(
    scenario: &Scenario,
    policy: IssuePolicy,
    keep_going: bool,
    output: OutputMode,
    source: &Path,
) -> anyhow::Result<()> {
    let mut manager = IssueManager::with_policy(policy);
    let outcomes = scenario.apply(&mut manager, keep_going);
    let failed = outcomes.iter().filter(|o| !o.ok).count();
    info!(
        source = %source.display(),
        entries = outcomes.len(),
        failed,
        "scenario finished"
    );

    let report = RunReport {
        ok: failed == 0,
        outcomes,
        summary: manager.summary(),
    };
    emit(output, &report)?;

    if let Some(err) = report.outcomes.iter().find_map(|o| o.error.as_ref()) {
        ErrorReport::from(err).report(output)?;
    }
    if failed > 0 {
        anyhow::bail!("{failed} scenario entr{} failed", if failed == 1 { "y" } else { "ies" });
    }
    Ok(())
}

/// Short note for pretty output: the code summary rather than the full message.
fn outcome_summary(outcome: &Outcome) -> String {
    match &outcome.error {
        Some(err) => format!("{} ({})", err.summary, err.error_code),
        None => outcome_note(outcome),
    }
}

fn outcome_note(outcome: &Outcome) -> String {
    match (&outcome.detail, &outcome.error) {
        (_, Some(err)) => format!("{} ({})", err.message, err.error_code),
        (Some(detail), None) => detail.to_string(),
        (None, None) => String::new(),
    }
}

fn counts_line(counts: &BTreeMap<Severity, usize>) -> String {
    if counts.is_empty() {
        return "(none)".to_string();
    }
    counts
        .iter()
        .map(|(severity, count)| format!("{severity}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Render for RunReport {
    fn text(&self, w: &mut dyn Write) -> io::Result<()> {
        for outcome in &self.outcomes {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                if outcome.ok { "ok" } else { "err" },
                outcome.op,
                outcome.target,
                outcome_note(outcome)
            )?;
        }
        for ticket in &self.summary.tickets {
            writeln!(
                w,
                "ticket\t{}\t{}\t{}\t{}\t{}\t{}",
                ticket.id(),
                ticket.severity(),
                ticket.state(),
                ticket.component(),
                ticket.author(),
                ticket.maintainer().unwrap_or("-")
            )?;
        }
        for (label, counts) in [
            ("open", &self.summary.open_by_severity),
            ("all", &self.summary.all_by_severity),
        ] {
            for (severity, count) in counts {
                writeln!(w, "count\t{label}\t{severity}\t{count}")?;
            }
        }
        for standing in &self.summary.top_maintainers {
            writeln!(w, "maintainer\t{}\t{}", standing.username, standing.closed)?;
        }
        Ok(())
    }

    fn pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        section(w, "Scenario")?;
        for outcome in &self.outcomes {
            let mark = if outcome.ok { "✓" } else { "✗" };
            writeln!(
                w,
                "{mark} {:<9} {:<28} {}",
                outcome.op,
                outcome.target,
                outcome_summary(outcome)
            )?;
        }
        writeln!(w)?;

        section(w, "Tickets by severity")?;
        if self.summary.tickets.is_empty() {
            writeln!(w, "(no tickets)")?;
        }
        for ticket in &self.summary.tickets {
            writeln!(
                w,
                "#{:<4} {:<9} {:<9} {}",
                ticket.id(),
                ticket.severity(),
                ticket.state(),
                ticket.description()
            )?;
            field(w, "  component", ticket.component())?;
            field(w, "  reporter", ticket.author())?;
            if let Some(maintainer) = ticket.maintainer() {
                field(w, "  maintainer", maintainer)?;
            }
            if let Some(resolution) = ticket.resolution() {
                field(w, "  resolution", resolution)?;
            }
        }
        writeln!(w)?;

        section(w, "Counts")?;
        field(w, "open", counts_line(&self.summary.open_by_severity))?;
        field(w, "all", counts_line(&self.summary.all_by_severity))?;
        writeln!(w)?;

        section(w, "Top maintainers")?;
        for standing in &self.summary.top_maintainers {
            writeln!(w, "{standing}")?;
        }
        rule(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_report() -> RunReport {
        let mut manager = IssueManager::new();
        let outcomes = scenario::demo().apply(&mut manager, false);
        RunReport {
            ok: true,
            outcomes,
            summary: manager.summary(),
        }
    }

    #[test]
    fn text_output_lists_counts_and_maintainers() {
        let mut buf = Vec::new();
        demo_report().text(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("count\topen\tmajor\t2\n"));
        assert!(text.contains("count\tall\tblocking\t1\n"));
        assert!(text.contains("maintainer\tdelta\t1\n"));
        assert!(text.contains("ticket\t4\tblocking\tclosed\t/System\talpha\tdelta\n"));
    }

    #[test]
    fn pretty_output_has_sections() {
        let mut buf = Vec::new();
        demo_report().pretty(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Tickets by severity"));
        assert!(text.contains("open:        major=2 minor=1"));
        assert!(text.contains("delta: 1"));
    }

    #[test]
    fn failed_entry_shows_summary_in_pretty_and_message_in_text() {
        let mut manager = IssueManager::new();
        let mut walkthrough = scenario::demo();
        walkthrough.steps.push(scenario::Step::Close {
            ticket: ticketing_core::TicketId::new(1),
            resolution: "too early".into(),
        });
        let outcomes = walkthrough.apply(&mut manager, false);
        let report = RunReport {
            ok: false,
            outcomes,
            summary: manager.summary(),
        };

        let mut buf = Vec::new();
        report.pretty(&mut buf).expect("render");
        let pretty = String::from_utf8(buf).expect("utf8");
        assert!(pretty.contains("Ticket is not assigned (E3005)"));

        let mut buf = Vec::new();
        report.text(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains(
            "err\tclose\t1\tticket 1 cannot be closed from state open (E3005)\n"
        ));
    }

    #[test]
    fn empty_counts_render_placeholder() {
        assert_eq!(counts_line(&BTreeMap::new()), "(none)");
    }
}
