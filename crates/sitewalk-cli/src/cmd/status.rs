//! `sw status`: raw status code tallies.

use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use sitewalk_core::aggregate::{StateCounts, StatusBreakdown, category_states, status_breakdown};
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::query;

use super::FilterArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `sw status`.
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Payload for `sw status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub apartment: Option<String>,
    #[serde(flatten)]
    pub breakdown: StatusBreakdown,
    /// Canonical states per category, from apartment-assigned items only.
    pub categories: BTreeMap<String, StateCounts>,
}

/// Execute `sw status`.
pub fn run_status(
    args: &StatusArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let filter = args.filter.to_filter(config)?;
    let conn = super::open_store(config)?;

    let mut report = StatusReport {
        apartment: filter.apartment.clone(),
        breakdown: StatusBreakdown::default(),
        categories: BTreeMap::new(),
    };

    if super::apartment_known(&conn, &filter)? {
        report.breakdown = status_breakdown(query::status_counts(&conn, &filter)?);
        let items = query::list_snapshot_rows(&conn, &filter)?;
        report.categories = category_states(&items, &filter);
    }

    render_mode(output, &report, render_status_text, render_status_pretty)
}

fn render_status_text(report: &StatusReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "status\tcount")?;
    for (status, count) in &report.breakdown.by_status {
        writeln!(w, "{status}\t{count}")?;
    }
    writeln!(w, "TOTAL\t{}", report.breakdown.total)
}

fn render_status_pretty(report: &StatusReport, w: &mut dyn Write) -> io::Result<()> {
    let heading = report
        .apartment
        .as_deref()
        .map_or_else(|| "All apartments".to_string(), |a| format!("Apartment {a}"));
    pretty_section(w, &heading)?;

    let breakdown = &report.breakdown;
    pretty_kv(w, "Total", breakdown.total.to_string())?;
    pretty_kv(w, "Completed", breakdown.completed.to_string())?;
    pretty_kv(w, "Defects", breakdown.defects.to_string())?;
    pretty_kv(w, "In progress", breakdown.in_progress.to_string())?;

    if !breakdown.by_status.is_empty() {
        writeln!(w, "\nBy status:")?;
        for (status, count) in &breakdown.by_status {
            writeln!(w, "  {status:<14} {count}")?;
        }
    }

    if !report.categories.is_empty() {
        writeln!(w, "\nBy category (ok / defect / pending / other):")?;
        for (category, counts) in &report.categories {
            writeln!(
                w,
                "  {category:<24} {} / {} / {} / {}",
                counts.ok, counts.defect, counts.pending, counts.info
            )?;
        }
    }
    Ok(())
}
