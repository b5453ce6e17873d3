//! `sw progress`: cumulative completion per apartment and category.
//!
//! Every report is counted as a full snapshot, so the cumulative columns
//! keep growing with each inspection. See `sitewalk_core::aggregate`.

use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use sitewalk_core::aggregate::{ProgressRow, ReportFilter, build_snapshot_counts, progress_table};
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::query;
use sitewalk_core::model::date::date_label;
use tracing::info;

use super::FilterArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `sw progress`.
#[derive(Args, Debug, Default)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Payload for `sw progress`.
#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub apartment: Option<String>,
    pub since_ms: Option<i64>,
    pub include_errored: bool,
    pub rows: Vec<ProgressRow>,
}

impl ProgressReport {
    fn empty(filter: &ReportFilter) -> Self {
        Self {
            apartment: filter.apartment.clone(),
            since_ms: filter.since_ms,
            include_errored: filter.include_errored,
            rows: Vec::new(),
        }
    }
}

/// Execute `sw progress`.
pub fn run_progress(
    args: &ProgressArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let filter = args.filter.to_filter(config)?;
    let conn = super::open_store(config)?;

    let mut report = ProgressReport::empty(&filter);
    if super::apartment_known(&conn, &filter)? {
        let items = query::list_snapshot_rows(&conn, &filter)?;
        report.rows = progress_table(&build_snapshot_counts(&items, &filter));
    }
    if report.rows.is_empty() {
        info!("no tracked work items matched the filter");
    }

    render_mode(output, &report, render_progress_text, render_progress_pretty)
}

fn render_progress_text(report: &ProgressReport, w: &mut dyn Write) -> io::Result<()> {
    if report.rows.is_empty() {
        return Ok(());
    }
    writeln!(
        w,
        "apartment\tcategory\tdate\tok\tdefect\tpending\tcum_ok\tcum_defect\tcum_pending\tcum_total\tscope\tcompletion_pct"
    )?;
    for progress in &report.rows {
        let row = &progress.row;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}",
            row.apartment,
            row.category,
            date_label(row.report_date_ms),
            row.ok,
            row.defect,
            row.pending,
            row.cumulative_ok,
            row.cumulative_defect,
            row.cumulative_pending,
            row.cumulative_total,
            progress.total_scope,
            progress.completion_pct,
        )?;
    }
    Ok(())
}

fn render_progress_pretty(report: &ProgressReport, w: &mut dyn Write) -> io::Result<()> {
    if report.rows.is_empty() {
        return writeln!(w, "No tracked work items matched.");
    }

    let mut current: Option<(&str, &str)> = None;
    for progress in &report.rows {
        let row = &progress.row;
        if current.map(|(apartment, _)| apartment) != Some(row.apartment.as_str()) {
            if current.is_some() {
                writeln!(w)?;
            }
            pretty_section(w, &format!("Apartment {}", row.apartment))?;
        }
        if current != Some((row.apartment.as_str(), row.category.as_str())) {
            pretty_kv(
                w,
                &row.category,
                format!("scope {}", progress.total_scope),
            )?;
            current = Some((row.apartment.as_str(), row.category.as_str()));
        }
        writeln!(
            w,
            "  {}  ok {:>4}  defect {:>4}  pending {:>4}  total {:>5}  {:>6.1}%",
            date_label(row.report_date_ms),
            row.cumulative_ok,
            row.cumulative_defect,
            row.cumulative_pending,
            row.cumulative_total,
            progress.completion_pct,
        )?;
    }
    Ok(())
}
