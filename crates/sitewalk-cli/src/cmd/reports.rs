//! `sw reports`: per-report item totals.
//!
//! Reports with items but no defects get a few sample items attached, which
//! is usually enough to tell a clean inspection from a mis-parsed document.

use std::io::{self, Write};

use clap::Args;
use rusqlite::Connection;
use sitewalk_core::aggregate::ReportTotals;
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::query;
use sitewalk_core::model::ReportRow;
use sitewalk_core::model::date::date_label;
use tracing::debug;

use super::FilterArgs;
use crate::output::{OutputMode, Renderable, render_list};

/// Sample items attached to a zero-defect report by default.
pub const DEFAULT_SAMPLES: u32 = 5;

/// Arguments for `sw reports`.
#[derive(Args, Debug, Default)]
pub struct ReportsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Sample items to show for reports without defects.
    #[arg(long, default_value_t = DEFAULT_SAMPLES, value_name = "N")]
    pub samples: u32,
}

/// Execute `sw reports`.
pub fn run_reports(
    args: &ReportsArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let filter = args.filter.to_filter(config)?;
    let conn = super::open_store(config)?;

    let totals = if super::apartment_known(&conn, &filter)? {
        let reports = query::list_reports(&conn, &filter)?;
        report_totals(&conn, &reports, filter.apartment.as_deref(), args.samples)?
    } else {
        Vec::new()
    };

    render_list(&totals, output)
}

/// Totals for each report, with samples on zero-defect reports.
///
/// With `apartment` set, both the totals and the samples cover only that
/// apartment's items.
pub fn report_totals(
    conn: &Connection,
    reports: &[ReportRow],
    apartment: Option<&str>,
    samples: u32,
) -> anyhow::Result<Vec<ReportTotals>> {
    let mut totals = Vec::with_capacity(reports.len());
    for report in reports {
        let by_status = query::status_counts_for_report(conn, &report.id, apartment)?;
        let mut entry = ReportTotals::from_counts(report, &by_status);
        if entry.zero_defects && samples > 0 {
            debug!(report = %report.id, "report has no defects; attaching samples");
            entry.samples = query::report_items(conn, &report.id, apartment, samples)?;
        }
        totals.push(entry);
    }
    Ok(totals)
}

impl Renderable for ReportTotals {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let name = self.file_name.as_deref().unwrap_or("(unnamed)");
        if self.errored {
            writeln!(w, "{}  {}  [errored]", date_label(self.report_date_ms), name)?;
        } else {
            writeln!(w, "{}  {}", date_label(self.report_date_ms), name)?;
        }
        writeln!(
            w,
            "  total {}  completed {}  defects {}  pending {}",
            self.total, self.completed, self.defects, self.pending
        )?;
        if self.zero_defects {
            writeln!(w, "  no defects recorded; sample items:")?;
            for sample in &self.samples {
                writeln!(
                    w,
                    "    [{}] {}: {}",
                    sample.status,
                    sample.category,
                    sample.description.as_deref().unwrap_or("")
                )?;
            }
        }
        Ok(())
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.report_id,
            date_label(self.report_date_ms),
            self.file_name.as_deref().unwrap_or(""),
            self.total,
            self.completed,
            self.defects,
            self.pending,
            self.zero_defects,
            self.errored
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &[
            "report_id",
            "date",
            "file_name",
            "total",
            "completed",
            "defects",
            "pending",
            "zero_defects",
            "errored",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitewalk_core::aggregate::ReportFilter;
    use sitewalk_core::db::schema;

    fn store() -> Connection {
        let conn = Connection::open_in_memory().expect("open memory db");
        schema::create_schema(&conn).expect("schema");
        conn.execute_batch(
            r#"
            INSERT INTO "Apartment" ("id", "number") VALUES ('a7', '7');
            INSERT INTO "Report" ("id", "fileName", "reportDate") VALUES ('clean', 'clean.pdf', 100);
            INSERT INTO "Report" ("id", "fileName", "reportDate") VALUES ('dirty', 'dirty.pdf', 200);
            INSERT INTO "WorkItem" ("id", "reportId", "apartmentId", "category", "status", "description")
                VALUES ('i1', 'clean', 'a7', 'Paint', 'COMPLETED', 'Walls'),
                       ('i2', 'clean', 'a7', 'Paint', 'IN_PROGRESS', 'Ceiling'),
                       ('i3', 'dirty', 'a7', 'Paint', 'DEFECT', 'Crack');
            "#,
        )
        .expect("seed");
        conn
    }

    #[test]
    fn samples_only_for_zero_defect_reports() {
        let conn = store();
        let reports = query::list_reports(&conn, &ReportFilter::default()).expect("reports");
        let totals = report_totals(&conn, &reports, None, 1).expect("totals");

        assert_eq!(totals.len(), 2);
        assert!(totals[0].zero_defects);
        assert_eq!(totals[0].samples.len(), 1);
        assert_eq!(totals[0].samples[0].description.as_deref(), Some("Walls"));
        assert!(!totals[1].zero_defects);
        assert!(totals[1].samples.is_empty());
    }

    #[test]
    fn table_row_matches_headers() {
        let conn = store();
        let reports = query::list_reports(&conn, &ReportFilter::default()).expect("reports");
        let totals = report_totals(&conn, &reports, None, 0).expect("totals");

        let mut buf = Vec::new();
        totals[1].render_table(&mut buf).expect("render");
        let row = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            row.trim_end().split('\t').count(),
            ReportTotals::table_headers().len()
        );
        assert_eq!(row, "dirty\t1970-01-01\tdirty.pdf\t1\t0\t1\t0\tfalse\tfalse\n");
    }

    #[test]
    fn apartment_totals_ignore_other_apartments() {
        let conn = Connection::open_in_memory().expect("open memory db");
        schema::create_schema(&conn).expect("schema");
        conn.execute_batch(
            r#"
            INSERT INTO "Apartment" ("id", "number") VALUES ('a7', '7'), ('a8', '8');
            INSERT INTO "Report" ("id", "fileName", "reportDate") VALUES ('shared', 'shared.pdf', 100);
            INSERT INTO "WorkItem" ("id", "reportId", "apartmentId", "category", "status", "description")
                VALUES ('i1', 'shared', 'a7', 'Paint', 'COMPLETED', 'Walls'),
                       ('i2', 'shared', 'a8', 'Paint', 'DEFECT', 'Crack'),
                       ('i3', 'shared', 'a8', 'Tiles', 'DEFECT', 'Chipped');
            "#,
        )
        .expect("seed");

        let filter = ReportFilter::default().for_apartment("7");
        let reports = query::list_reports(&conn, &filter).expect("reports");
        let totals =
            report_totals(&conn, &reports, filter.apartment.as_deref(), 5).expect("totals");

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, 1);
        assert_eq!(totals[0].defects, 0);
        assert!(totals[0].zero_defects);
        assert_eq!(totals[0].samples.len(), 1);
        assert_eq!(totals[0].samples[0].description.as_deref(), Some("Walls"));

        let whole = report_totals(&conn, &reports, None, 5).expect("totals");
        assert_eq!(whole[0].total, 3);
        assert_eq!(whole[0].defects, 2);
    }

    #[test]
    fn errored_reports_are_marked() {
        let conn = store();
        conn.execute(r#"UPDATE "Report" SET "hasErrors" = 1 WHERE "id" = 'dirty'"#, [])
            .expect("flag report");
        let filter = ReportFilter::default().including_errored(true);
        let reports = query::list_reports(&conn, &filter).expect("reports");
        let totals = report_totals(&conn, &reports, None, 0).expect("totals");

        assert!(!totals[0].errored);
        assert!(totals[1].errored);

        let mut buf = Vec::new();
        totals[1].render_human(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("1970-01-01  dirty.pdf  [errored]"));
    }
}
