//! `sw defects`: open defects per report, or defects that keep coming back.

use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use sitewalk_core::aggregate::{
    DefectHistoryPoint, RecurringDefect, defect_history, recurring_defects,
};
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::query;
use sitewalk_core::model::date::date_label;

use super::FilterArgs;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `sw defects`.
#[derive(Args, Debug, Default)]
pub struct DefectsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// List defects repeated from the apartment's previous report instead.
    #[arg(long)]
    pub recurring: bool,
}

/// Payload for `sw defects`.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DefectsReport {
    History { points: Vec<DefectHistoryPoint> },
    Recurring { defects: Vec<RecurringDefect> },
}

/// Execute `sw defects`.
pub fn run_defects(
    args: &DefectsArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let filter = args.filter.to_filter(config)?;
    let conn = super::open_store(config)?;

    let items = if super::apartment_known(&conn, &filter)? {
        query::list_snapshot_rows(&conn, &filter)?
    } else {
        Vec::new()
    };

    let report = if args.recurring {
        DefectsReport::Recurring {
            defects: recurring_defects(&items, &filter),
        }
    } else {
        DefectsReport::History {
            points: defect_history(&items, &filter),
        }
    };

    render_mode(output, &report, render_defects_text, render_defects_pretty)
}

fn render_defects_text(report: &DefectsReport, w: &mut dyn Write) -> io::Result<()> {
    match report {
        DefectsReport::History { points } => {
            if points.is_empty() {
                return Ok(());
            }
            writeln!(w, "apartment\tdate\tcategory\tdefects")?;
            for point in points {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    point.apartment,
                    date_label(point.report_date_ms),
                    point.category,
                    point.pending_defects
                )?;
            }
        }
        DefectsReport::Recurring { defects } => {
            if defects.is_empty() {
                return Ok(());
            }
            writeln!(w, "apartment\tdate\tprevious\tcategory\tlocation\tdescription")?;
            for defect in defects {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    defect.key.apartment,
                    date_label(defect.report_date_ms),
                    date_label(defect.previous_report_date_ms),
                    defect.key.category,
                    defect.key.location,
                    defect.key.description
                )?;
            }
        }
    }
    Ok(())
}

fn render_defects_pretty(report: &DefectsReport, w: &mut dyn Write) -> io::Result<()> {
    match report {
        DefectsReport::History { points } => {
            if points.is_empty() {
                return writeln!(w, "No reports matched.");
            }
            let mut current: Option<(&str, i64)> = None;
            for point in points {
                if current.map(|(apartment, _)| apartment) != Some(point.apartment.as_str()) {
                    if current.is_some() {
                        writeln!(w)?;
                    }
                    pretty_section(w, &format!("Apartment {} defect history", point.apartment))?;
                }
                if current != Some((point.apartment.as_str(), point.report_date_ms)) {
                    writeln!(w, "{}", date_label(point.report_date_ms))?;
                    current = Some((point.apartment.as_str(), point.report_date_ms));
                }
                if point.pending_defects > 0 {
                    writeln!(w, "  {:<24} {}", point.category, point.pending_defects)?;
                }
            }
        }
        DefectsReport::Recurring { defects } => {
            if defects.is_empty() {
                return writeln!(w, "No recurring defects.");
            }
            pretty_section(w, "Recurring defects")?;
            for defect in defects {
                writeln!(
                    w,
                    "apt {}  {} (since {})  {} / {}: {}",
                    defect.key.apartment,
                    date_label(defect.report_date_ms),
                    date_label(defect.previous_report_date_ms),
                    defect.key.category,
                    defect.key.location,
                    defect.key.description
                )?;
            }
        }
    }
    Ok(())
}
