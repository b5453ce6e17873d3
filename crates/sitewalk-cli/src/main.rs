#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use sitewalk_core::config::resolve_config;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "sitewalk: apartment inspection progress reporting",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress everything but errors in the log.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Inspection store path (overrides SITEWALK_DB and config).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Progress",
        about = "Show cumulative progress per apartment and category",
        long_about = "Count every report as a snapshot and accumulate OK, DEFECT and PENDING items per apartment and category across report dates.",
        after_help = "EXAMPLES:\n    # Progress for every apartment\n    sw progress\n\n    # One apartment since October\n    sw progress --apartment 7 --since 2025-10-01\n\n    # Emit machine-readable output\n    sw progress --json"
    )]
    Progress(cmd::progress::ProgressArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Show open defects per report",
        long_about = "Show open defects per report date and category, or defects repeated from the previous report.",
        after_help = "EXAMPLES:\n    # Defect history for apartment 7\n    sw defects --apartment 7\n\n    # Defects carried over between consecutive reports\n    sw defects --recurring"
    )]
    Defects(cmd::defects::DefectsArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Write chart series files",
        long_about = "Write multi-state, percentage and defect series as JSON files, three per apartment.",
        after_help = "EXAMPLES:\n    # Write into ./chart_output\n    sw charts\n\n    # Custom directory and prefix\n    sw charts --out out/charts --prefix unit"
    )]
    Charts(cmd::charts::ChartsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Count raw status codes",
        long_about = "Count work items by stored status code, plus canonical states per category.",
        after_help = "EXAMPLES:\n    # Status codes for apartment 7\n    sw status --apartment 7\n\n    # Whole store, including errored reports\n    sw status --include-errored"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List reports with item totals",
        long_about = "List reports with item totals; reports without defects include sample items.",
        after_help = "EXAMPLES:\n    # All reports\n    sw reports\n\n    # Reports since a date, as JSON\n    sw reports --since 2025-11-01 --json"
    )]
    Reports(cmd::reports::ReportsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Find reports by file name",
        long_about = "Find reports whose file name contains any of the given patterns.",
        after_help = "EXAMPLES:\n    # Two spellings of the same date\n    sw find-report 10.2.26 2026-02-10"
    )]
    FindReport(cmd::find_report::FindReportArgs),

    #[command(
        next_help_heading = "Labels",
        about = "Map an inspector label to a code",
        long_about = "Map a status or category label as written in a report to the stored code.",
        after_help = "EXAMPLES:\n    # Status label\n    sw normalize status \"לא תקין\"\n\n    # Category label\n    sw normalize category \"אינסטלציה\""
    )]
    Normalize(cmd::normalize::NormalizeArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    sw completions bash\n\n    # Generate zsh completions\n    sw completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn default_log_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose || env::var("DEBUG").is_ok() {
        "sitewalk_core=debug,sw=debug,info"
    } else {
        "sitewalk_core=info,sw=info,warn"
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("SITEWALK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose, quiet)));

    let format = env::var("SITEWALK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

/// Run the selected command. A failure carries the output mode it should be
/// reported in.
fn run(cli: &Cli, project_root: &Path) -> Result<(), (anyhow::Error, OutputMode)> {
    let fallback = resolve_output_mode(cli.format, cli.json);

    match &cli.command {
        Commands::Completions(args) => {
            let mut command = Cli::command();
            return cmd::completions::run_completions(args, &mut command)
                .map_err(|err| (err, fallback));
        }
        Commands::Normalize(args) => {
            return cmd::normalize::run_normalize(args, fallback).map_err(|err| (err, fallback));
        }
        _ => {}
    }

    let config =
        resolve_config(project_root, cli.json, cli.db.as_deref()).map_err(|err| (err, fallback))?;
    let output = cli
        .format
        .or_else(|| OutputMode::from_name(&config.resolved_output))
        .unwrap_or(fallback);
    debug!(?output, store = %config.store_path.display(), "running command");

    let result = match &cli.command {
        Commands::Progress(args) => cmd::progress::run_progress(args, output, &config),
        Commands::Defects(args) => cmd::defects::run_defects(args, output, &config),
        Commands::Charts(args) => cmd::charts::run_charts(args, output, &config),
        Commands::Status(args) => cmd::status::run_status(args, output, &config),
        Commands::Reports(args) => cmd::reports::run_reports(args, output, &config),
        Commands::FindReport(args) => cmd::find_report::run_find_report(args, output, &config),
        Commands::Completions(_) | Commands::Normalize(_) => Ok(()),
    };
    result.map_err(|err| (err, output))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let project_root = env::current_dir()?;

    match run(&cli, &project_root) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err((err, output)) => {
            debug!(error = ?err, "command failed");
            render_error(output, &CliError::from(&err))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
