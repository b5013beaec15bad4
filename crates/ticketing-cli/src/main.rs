#![forbid(unsafe_code)]

mod cmd;
mod output;
mod scenario;

use clap::{CommandFactory, Parser, Subcommand};
use output::{ErrorReport, OutputMode};
use std::env;
use ticketing_core::IssuePolicy;
use ticketing_core::config::{self, ProjectConfig};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "tkt",
    author,
    version,
    about = "tkt: in-memory issue tracker driver",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Reject tickets opened by users without the reporter role.
    #[arg(long, global = true)]
    require_reporter: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Project config with command-line overrides applied.
    fn policy(&self, project: &ProjectConfig) -> IssuePolicy {
        let mut policy = IssuePolicy::from_project_config(project);
        if self.require_reporter {
            policy.require_reporter_role = true;
        }
        policy
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Scenarios",
        about = "Run the built-in walkthrough",
        long_about = "Register five users, build the System component tree, open four tickets, \
                      assign and close one, then report.",
        after_help = "EXAMPLES:\n    # Human-readable report\n    tkt demo\n\n    # Emit machine-readable output\n    tkt demo --format json"
    )]
    Demo(cmd::run::DemoArgs),

    #[command(
        next_help_heading = "Scenarios",
        about = "Run a scenario file",
        long_about = "Execute the users, components and steps of a TOML scenario against a fresh tracker.",
        after_help = "EXAMPLES:\n    # Stop at the first failing step\n    tkt run scenario.toml\n\n    # Record failures and keep going\n    tkt run scenario.toml --keep-going"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tkt completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TICKETING_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ticketing=debug,info"
        } else {
            "ticketing=info,warn"
        })
    });

    let format = env::var("TICKETING_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_config = config::load_user_config().unwrap_or_else(|e| {
        debug!("ignoring unreadable user config: {e:#}");
        config::UserConfig::default()
    });
    let output = output::resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());

    let project_root = env::current_dir()?;
    let project = match config::load_project_config(&project_root) {
        Ok(project) => project,
        Err(e) => {
            ErrorReport::new(
                "config_invalid",
                format!("{e:#}"),
                "Fix the syntax in .ticketing/config.toml and retry",
            )
            .report(output)?;
            return Err(e);
        }
    };
    let policy = cli.policy(&project);
    info!(?policy, "tracker policy resolved");

    match cli.command {
        Commands::Demo(ref args) => cmd::run::run_demo(args, policy, output),
        Commands::Run(ref args) => cmd::run::run_scenario_file(args, policy, output),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    }
}
