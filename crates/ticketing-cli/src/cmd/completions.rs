//! `tkt completions <SHELL>`: shell completion scripts.

use std::io::Write;

use clap::Args;
use clap_complete::{Shell, generate};

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `command` to `out`, named after the binary.
pub fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    let bin_name = command.get_name().to_string();
    generate(shell, command, bin_name, out);
}

/// Generate the completion script to stdout.
///
/// # Errors
///
/// Returns an error if flushing stdout fails.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(args.shell, command, &mut out);
    out.flush()?;
    Ok(())
}
