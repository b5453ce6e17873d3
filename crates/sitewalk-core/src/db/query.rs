//! Typed queries against the inspection store.
//!
//! Every function takes a shared `&Connection` and returns typed rows.
//! Values always travel as bound parameters (`?N`), never spliced into SQL.

use anyhow::{Context, Result};
use rusqlite::{Connection, params, params_from_iter, types::ToSql};
use std::collections::BTreeMap;

use crate::aggregate::ReportFilter;
use crate::model::{ApartmentRow, ItemSample, ReportRow, SnapshotRow};

// ---------------------------------------------------------------------------
// Filter translation
// ---------------------------------------------------------------------------

/// WHERE fragments plus their bound values, built from a [`ReportFilter`].
///
/// Fragments reference the `r` (Report) and `a` (Apartment) aliases.
struct Conditions {
    clauses: Vec<String>,
    values: Vec<Box<dyn ToSql>>,
}

impl Conditions {
    fn new() -> Self {
        Self {
            clauses: Vec::new(),
            values: Vec::new(),
        }
    }

    fn bind(&mut self, value: impl ToSql + 'static) -> usize {
        self.values.push(Box::new(value));
        self.values.len()
    }

    fn report_flags(mut self, filter: &ReportFilter) -> Self {
        if !filter.include_errored {
            self.clauses
                .push(r#"(r."hasErrors" = 0 OR r."hasErrors" IS NULL)"#.to_string());
        }
        if let Some(since) = filter.since_ms {
            let n = self.bind(since);
            self.clauses.push(format!(r#"r."reportDate" >= ?{n}"#));
        }
        self
    }

    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        self.values.iter().map(AsRef::as_ref).collect()
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Reports admitted by `filter`, oldest first.
///
/// With an apartment set, only reports holding at least one item for that
/// apartment are returned.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_reports(conn: &Connection, filter: &ReportFilter) -> Result<Vec<ReportRow>> {
    let mut conditions = Conditions::new().report_flags(filter);
    if let Some(apartment) = &filter.apartment {
        let n = conditions.bind(apartment.clone());
        conditions.clauses.push(format!(
            r#"EXISTS (SELECT 1 FROM "WorkItem" wi JOIN "Apartment" a ON wi."apartmentId" = a."id" WHERE wi."reportId" = r."id" AND a."number" = ?{n})"#
        ));
    }

    let sql = format!(
        r#"SELECT r."id", r."fileName", r."reportDate", r."hasErrors" FROM "Report" r{} ORDER BY r."reportDate" ASC, r."id" ASC"#,
        conditions.where_clause()
    );

    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare list_reports query: {sql}"))?;
    let rows = stmt
        .query_map(params_from_iter(conditions.params()), row_to_report)
        .context("execute list_reports query")?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(row.context("read list_reports row")?);
    }
    Ok(reports)
}

/// All apartments ordered by number.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_apartments(conn: &Connection) -> Result<Vec<ApartmentRow>> {
    let mut stmt = conn
        .prepare(r#"SELECT "id", "number" FROM "Apartment" ORDER BY "number""#)
        .context("prepare list_apartments")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ApartmentRow {
                id: row.get(0)?,
                number: row.get(1)?,
            })
        })
        .context("execute list_apartments")?;

    let mut apartments = Vec::new();
    for row in rows {
        apartments.push(row.context("read apartment row")?);
    }
    Ok(apartments)
}

/// Whether an apartment with this number exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn apartment_exists(conn: &Connection, number: &str) -> Result<bool> {
    conn.query_row(
        r#"SELECT EXISTS(SELECT 1 FROM "Apartment" WHERE "number" = ?1)"#,
        [number],
        |row| row.get(0),
    )
    .context("check apartment exists")
}

/// Work items joined with their report and apartment, ordered by report date.
///
/// Items without an apartment are skipped. This is the aggregator's input.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_snapshot_rows(conn: &Connection, filter: &ReportFilter) -> Result<Vec<SnapshotRow>> {
    let mut conditions = Conditions::new().report_flags(filter);
    conditions
        .clauses
        .push(r#"wi."apartmentId" IS NOT NULL"#.to_string());
    if let Some(apartment) = &filter.apartment {
        let n = conditions.bind(apartment.clone());
        conditions.clauses.push(format!(r#"a."number" = ?{n}"#));
    }

    let sql = format!(
        r#"SELECT r."id", r."reportDate", r."hasErrors", a."number", wi."category", wi."status", wi."location", wi."description"
           FROM "WorkItem" wi
           JOIN "Report" r ON wi."reportId" = r."id"
           JOIN "Apartment" a ON wi."apartmentId" = a."id"{}
           ORDER BY r."reportDate" ASC, wi."id" ASC"#,
        conditions.where_clause()
    );

    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare list_snapshot_rows query: {sql}"))?;
    let rows = stmt
        .query_map(params_from_iter(conditions.params()), |row| {
            Ok(SnapshotRow {
                report_id: row.get(0)?,
                report_date_ms: row.get(1)?,
                report_has_errors: row.get(2)?,
                apartment: row.get(3)?,
                category: row.get(4)?,
                status: row.get(5)?,
                location: row.get(6)?,
                description: row.get(7)?,
            })
        })
        .context("execute list_snapshot_rows query")?;

    let mut items = Vec::new();
    for row in rows {
        items.push(row.context("read snapshot row")?);
    }
    tracing::debug!(rows = items.len(), "snapshot rows loaded");
    Ok(items)
}

// ---------------------------------------------------------------------------
// Aggregate helper queries
// ---------------------------------------------------------------------------

/// Raw status counts over items admitted by `filter`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn status_counts(conn: &Connection, filter: &ReportFilter) -> Result<BTreeMap<String, u64>> {
    let mut conditions = Conditions::new().report_flags(filter);
    if let Some(apartment) = &filter.apartment {
        let n = conditions.bind(apartment.clone());
        conditions.clauses.push(format!(r#"a."number" = ?{n}"#));
    }

    let sql = format!(
        r#"SELECT wi."status", COUNT(*)
           FROM "WorkItem" wi
           JOIN "Report" r ON wi."reportId" = r."id"
           LEFT JOIN "Apartment" a ON wi."apartmentId" = a."id"{}
           GROUP BY wi."status""#,
        conditions.where_clause()
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("prepare status_counts query")?;
    collect_counts(stmt.query_map(params_from_iter(conditions.params()), count_row)?)
}

/// Raw status counts for one report.
///
/// With `apartment` set, only that apartment's items are counted.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn status_counts_for_report(
    conn: &Connection,
    report_id: &str,
    apartment: Option<&str>,
) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn
        .prepare(
            r#"SELECT wi."status", COUNT(*)
               FROM "WorkItem" wi
               LEFT JOIN "Apartment" a ON wi."apartmentId" = a."id"
               WHERE wi."reportId" = ?1 AND (?2 IS NULL OR a."number" = ?2)
               GROUP BY wi."status""#,
        )
        .context("prepare status_counts_for_report")?;
    collect_counts(stmt.query_map(params![report_id, apartment], count_row)?)
        .with_context(|| format!("count statuses for report {report_id}"))
}

/// First `limit` items of a report, in insertion order.
///
/// With `apartment` set, only that apartment's items are sampled.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn report_items(
    conn: &Connection,
    report_id: &str,
    apartment: Option<&str>,
    limit: u32,
) -> Result<Vec<ItemSample>> {
    let mut stmt = conn
        .prepare(
            r#"SELECT wi."category", wi."description", wi."status", wi."notes"
               FROM "WorkItem" wi
               LEFT JOIN "Apartment" a ON wi."apartmentId" = a."id"
               WHERE wi."reportId" = ?1 AND (?2 IS NULL OR a."number" = ?2)
               ORDER BY wi.rowid LIMIT ?3"#,
        )
        .context("prepare report_items")?;
    let rows = stmt
        .query_map(params![report_id, apartment, limit], |row| {
            Ok(ItemSample {
                category: row.get(0)?,
                description: row.get(1)?,
                status: row.get(2)?,
                notes: row.get(3)?,
            })
        })
        .with_context(|| format!("execute report_items for {report_id}"))?;

    let mut samples = Vec::new();
    for row in rows {
        samples.push(row.context("read report item")?);
    }
    Ok(samples)
}

/// Reports whose file name matches any of `patterns`.
///
/// A pattern containing `%` is used as a LIKE pattern as-is; any other
/// pattern matches as a substring.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_reports_by_file_name(conn: &Connection, patterns: &[String]) -> Result<Vec<ReportRow>> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let mut conditions = Conditions::new();
    let mut alternatives = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let like = if pattern.contains('%') {
            pattern.clone()
        } else {
            format!("%{pattern}%")
        };
        let n = conditions.bind(like);
        alternatives.push(format!(r#"r."fileName" LIKE ?{n}"#));
    }

    let sql = format!(
        r#"SELECT r."id", r."fileName", r."reportDate", r."hasErrors" FROM "Report" r WHERE {} ORDER BY r."reportDate" ASC, r."id" ASC"#,
        alternatives.join(" OR ")
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("prepare find_reports_by_file_name")?;
    let rows = stmt
        .query_map(params_from_iter(conditions.params()), row_to_report)
        .context("execute find_reports_by_file_name")?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(row.context("read report row")?);
    }
    Ok(reports)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        file_name: row.get(1)?,
        report_date_ms: row.get(2)?,
        has_errors: row.get(3)?,
    })
}

fn count_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, u64)> {
    let status: String = row.get(0)?;
    let count: i64 = row.get(1)?;
    Ok((status, u64::try_from(count).unwrap_or(0)))
}

fn collect_counts(
    rows: impl Iterator<Item = rusqlite::Result<(String, u64)>>,
) -> Result<BTreeMap<String, u64>> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let (status, count) = row.context("read status count")?;
        counts.insert(status, count);
    }
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
