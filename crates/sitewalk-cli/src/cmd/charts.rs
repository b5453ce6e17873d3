//! `sw charts`: write per-apartment chart series files.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use sitewalk_core::aggregate::{build_snapshot_counts, defect_history, progress_table};
use sitewalk_core::chart::{WrittenChart, build_charts, write_charts};
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::query;
use tracing::{info, warn};

use super::FilterArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `sw charts`.
#[derive(Args, Debug, Default)]
pub struct ChartsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output directory (default: `[charts] output_dir`, else `chart_output`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// File name prefix (default: `[charts] prefix`, else `apt`).
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

/// Payload for `sw charts`.
#[derive(Debug, Serialize)]
pub struct ChartsReport {
    pub output_dir: PathBuf,
    pub files: Vec<WrittenChart>,
}

/// Execute `sw charts`.
pub fn run_charts(
    args: &ChartsArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let filter = args.filter.to_filter(config)?;
    let output_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.project.charts.output_dir.clone());
    let prefix = args
        .prefix
        .as_deref()
        .unwrap_or(&config.project.charts.prefix);

    let conn = super::open_store(config)?;
    let items = if super::apartment_known(&conn, &filter)? {
        query::list_snapshot_rows(&conn, &filter)?
    } else {
        Vec::new()
    };

    let progress = progress_table(&build_snapshot_counts(&items, &filter));
    let history = defect_history(&items, &filter);
    let charts = build_charts(&progress, &history);
    if charts.is_empty() {
        warn!("no tracked work items; no charts written");
    }

    let files = write_charts(&output_dir, prefix, &charts)?;
    info!(count = files.len(), dir = %output_dir.display(), "chart files written");

    let report = ChartsReport { output_dir, files };
    render_mode(output, &report, render_charts_text, render_charts_pretty)
}

fn render_charts_text(report: &ChartsReport, w: &mut dyn Write) -> io::Result<()> {
    for file in &report.files {
        writeln!(w, "{}\t{}\t{}", file.apartment, file.kind.as_str(), file.path.display())?;
    }
    Ok(())
}

fn render_charts_pretty(report: &ChartsReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Chart series")?;
    pretty_kv(w, "Directory", report.output_dir.display().to_string())?;
    pretty_kv(w, "Files", report.files.len().to_string())?;
    for file in &report.files {
        writeln!(w, "  {}", file.path.display())?;
    }
    Ok(())
}
