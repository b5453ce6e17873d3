//! Snapshot-based progress and defect aggregation.
//!
//! Every report is read as a complete snapshot of an apartment's items at
//! that moment. Nothing is carried from one report to the next: counts are
//! re-derived per report and then summed across report dates.
//!
//! All functions here are pure and take their input by reference, so they can
//! run concurrently on shared data without coordination.

pub mod cumulative;
pub mod defects;
pub mod snapshot;
pub mod summary;

pub use cumulative::{
    CumulativeRow, ProgressRow, StateCounts, accumulate, completion_pct, compute_scope,
    progress_table,
};
pub use defects::{DefectHistoryPoint, RecurringDefect, defect_history, recurring_defects};
pub use snapshot::{SnapshotCount, build_snapshot_counts};
pub use summary::{ReportTotals, StatusBreakdown, category_states, status_breakdown};

use crate::model::SnapshotRow;

/// Which report rows take part in an aggregation.
///
/// All fields combine with AND semantics. The default excludes errored
/// reports and applies no apartment or date restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Keep reports whose error flag is `true` (default: false).
    pub include_errored: bool,
    /// Exact apartment number.
    pub apartment: Option<String>,
    /// Inclusive lower bound on the report date, epoch milliseconds.
    pub since_ms: Option<i64>,
}

impl ReportFilter {
    #[must_use]
    pub fn for_apartment(mut self, apartment: impl Into<String>) -> Self {
        self.apartment = Some(apartment.into());
        self
    }

    #[must_use]
    pub const fn since(mut self, since_ms: i64) -> Self {
        self.since_ms = Some(since_ms);
        self
    }

    #[must_use]
    pub const fn including_errored(mut self, include: bool) -> Self {
        self.include_errored = include;
        self
    }

    #[must_use]
    pub fn admits(&self, row: &SnapshotRow) -> bool {
        if let Some(apartment) = &self.apartment {
            if *apartment != row.apartment {
                return false;
            }
        }
        if !self.include_errored && row.report_has_errors == Some(true) {
            return false;
        }
        self.since_ms.is_none_or(|since| row.report_date_ms >= since)
    }
}
