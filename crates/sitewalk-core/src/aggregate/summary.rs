//! Raw status tallies used for console summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ReportFilter;
use super::cumulative::StateCounts;
use crate::model::{ItemSample, ReportRow, SnapshotRow};

/// Raw status counts plus the headline totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub by_status: BTreeMap<String, u64>,
    pub total: u64,
    /// `COMPLETED` + `COMPLETED_OK`.
    pub completed: u64,
    pub defects: u64,
    pub in_progress: u64,
}

fn count_of(by_status: &BTreeMap<String, u64>, codes: &[&str]) -> u64 {
    codes
        .iter()
        .filter_map(|code| by_status.get(*code))
        .sum()
}

#[must_use]
pub fn status_breakdown(by_status: BTreeMap<String, u64>) -> StatusBreakdown {
    StatusBreakdown {
        total: by_status.values().sum(),
        completed: count_of(&by_status, &["COMPLETED", "COMPLETED_OK"]),
        defects: count_of(&by_status, &["DEFECT"]),
        in_progress: count_of(&by_status, &["IN_PROGRESS"]),
        by_status,
    }
}

/// Canonical state counts per category, info included.
#[must_use]
pub fn category_states(
    items: &[SnapshotRow],
    filter: &ReportFilter,
) -> BTreeMap<String, StateCounts> {
    let mut by_category: BTreeMap<String, StateCounts> = BTreeMap::new();
    for row in items.iter().filter(|row| filter.admits(row)) {
        by_category
            .entry(row.category.clone())
            .or_default()
            .add(row.state(), 1);
    }
    by_category
}

/// Item totals for a single report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub report_id: String,
    pub file_name: Option<String>,
    pub report_date_ms: i64,
    pub total: u64,
    pub defects: u64,
    pub completed: u64,
    /// `PENDING`, `IN_PROGRESS` and `NOT_STARTED`.
    pub pending: u64,
    /// Items were filed but none of them is a defect.
    pub zero_defects: bool,
    /// The report's error flag is set.
    pub errored: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<ItemSample>,
}

impl ReportTotals {
    #[must_use]
    pub fn from_counts(report: &ReportRow, by_status: &BTreeMap<String, u64>) -> Self {
        let total: u64 = by_status.values().sum();
        let defects = count_of(by_status, &["DEFECT"]);
        Self {
            report_id: report.id.clone(),
            file_name: report.file_name.clone(),
            report_date_ms: report.report_date_ms,
            total,
            defects,
            completed: count_of(by_status, &["COMPLETED", "COMPLETED_OK"]),
            pending: count_of(by_status, &["PENDING", "IN_PROGRESS", "NOT_STARTED"]),
            zero_defects: total > 0 && defects == 0,
            errored: report.is_errored(),
            samples: Vec::new(),
        }
    }
}
