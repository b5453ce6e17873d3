//! Defect history per report.
//!
//! Unlike the progress table, these values are not accumulated: a defect
//! that is absent from a later report is treated as fixed.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::ReportFilter;
use crate::model::{CanonicalState, ItemKey, SnapshotRow};

/// Open defects in one category of one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectHistoryPoint {
    pub apartment: String,
    pub report_date_ms: i64,
    pub category: String,
    pub pending_defects: u64,
}

/// A defect also listed as a defect in the apartment's previous report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringDefect {
    #[serde(flatten)]
    pub key: ItemKey,
    pub report_date_ms: i64,
    pub previous_report_date_ms: i64,
}

#[derive(Default)]
struct ApartmentReports<'a> {
    dates: BTreeSet<i64>,
    categories: BTreeSet<&'a str>,
    defects: BTreeMap<(i64, &'a str), u64>,
}

/// Defect counts on the full grid of an apartment's report dates and
/// categories, zero-filled where a category had no defects in a report.
///
/// Categories come from every admitted row, including info-state items, so
/// a category with no defects still shows up as a zero line.
#[must_use]
pub fn defect_history(items: &[SnapshotRow], filter: &ReportFilter) -> Vec<DefectHistoryPoint> {
    let mut by_apartment: BTreeMap<&str, ApartmentReports<'_>> = BTreeMap::new();

    for row in items.iter().filter(|row| filter.admits(row)) {
        let reports = by_apartment.entry(row.apartment.as_str()).or_default();
        reports.dates.insert(row.report_date_ms);
        reports.categories.insert(row.category.as_str());
        if row.state() == CanonicalState::Defect {
            *reports
                .defects
                .entry((row.report_date_ms, row.category.as_str()))
                .or_insert(0) += 1;
        }
    }

    let mut points = Vec::new();
    for (apartment, reports) in by_apartment {
        for &date in &reports.dates {
            for &category in &reports.categories {
                points.push(DefectHistoryPoint {
                    apartment: apartment.to_string(),
                    report_date_ms: date,
                    category: category.to_string(),
                    pending_defects: reports
                        .defects
                        .get(&(date, category))
                        .copied()
                        .unwrap_or(0),
                });
            }
        }
    }
    points
}

/// Defects whose identity repeats from the immediately preceding report of
/// the same apartment.
///
/// A report in which the item is missing, or no longer a defect, breaks the
/// chain. Cumulative progress figures count such repeats once per report;
/// this listing shows how many of those counts are the same finding.
#[must_use]
pub fn recurring_defects(items: &[SnapshotRow], filter: &ReportFilter) -> Vec<RecurringDefect> {
    let mut dates: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();
    let mut defects: BTreeMap<(&str, i64), BTreeSet<ItemKey>> = BTreeMap::new();

    for row in items.iter().filter(|row| filter.admits(row)) {
        dates
            .entry(row.apartment.as_str())
            .or_default()
            .insert(row.report_date_ms);
        if row.state() == CanonicalState::Defect {
            defects
                .entry((row.apartment.as_str(), row.report_date_ms))
                .or_default()
                .insert(row.key());
        }
    }

    let empty = BTreeSet::new();
    let mut recurring = Vec::new();
    for (apartment, report_dates) in dates {
        let ordered: Vec<i64> = report_dates.into_iter().collect();
        for pair in ordered.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            let before = defects.get(&(apartment, previous)).unwrap_or(&empty);
            let now = defects.get(&(apartment, current)).unwrap_or(&empty);
            for key in now.intersection(before) {
                recurring.push(RecurringDefect {
                    key: key.clone(),
                    report_date_ms: current,
                    previous_report_date_ms: previous,
                });
            }
        }
    }
    recurring
}
