//! `sw find-report`: look reports up by file name.

use clap::Args;
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::query;
use tracing::info;

use super::reports::{DEFAULT_SAMPLES, report_totals};
use crate::output::{OutputMode, render_list};

/// Arguments for `sw find-report`.
#[derive(Args, Debug)]
pub struct FindReportArgs {
    /// File name fragments; `%` and `_` act as SQL LIKE wildcards.
    #[arg(required = true, value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Sample items to show for matches without defects.
    #[arg(long, default_value_t = DEFAULT_SAMPLES, value_name = "N")]
    pub samples: u32,
}

/// Execute `sw find-report`.
///
/// Matches are not filtered by the error flag: a lookup by name should find
/// the report whatever state it is in.
pub fn run_find_report(
    args: &FindReportArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let conn = super::open_store(config)?;
    let reports = query::find_reports_by_file_name(&conn, &args.patterns)?;
    if reports.is_empty() {
        info!(patterns = ?args.patterns, "no report file name matched");
    }
    let totals = report_totals(&conn, &reports, None, args.samples)?;
    render_list(&totals, output)
}
