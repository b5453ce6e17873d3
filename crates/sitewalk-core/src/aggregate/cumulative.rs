use std::collections::BTreeMap;

use serde::Serialize;

use super::snapshot::SnapshotCount;
use crate::model::CanonicalState;

/// Per-state item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub ok: u64,
    pub defect: u64,
    pub pending: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub info: u64,
}

impl StateCounts {
    pub const fn add(&mut self, state: CanonicalState, count: u64) {
        match state {
            CanonicalState::Ok => self.ok += count,
            CanonicalState::Defect => self.defect += count,
            CanonicalState::Pending => self.pending += count,
            CanonicalState::Info => self.info += count,
        }
    }

    /// Sum of the tracked states; `info` never counts toward progress.
    #[must_use]
    pub const fn tracked_total(&self) -> u64 {
        self.ok + self.defect + self.pending
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Running totals for one apartment and category at one report date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CumulativeRow {
    pub apartment: String,
    pub category: String,
    pub report_date_ms: i64,
    /// Counts filed in this report alone.
    pub ok: u64,
    pub defect: u64,
    pub pending: u64,
    pub cumulative_ok: u64,
    pub cumulative_defect: u64,
    pub cumulative_pending: u64,
    pub cumulative_total: u64,
}

/// A cumulative row joined with its scope and completion percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRow {
    #[serde(flatten)]
    pub row: CumulativeRow,
    pub total_scope: u64,
    pub completion_pct: f64,
}

/// Pivot snapshot counts by state and accumulate them across report dates.
///
/// Rows are grouped per (apartment, category) and ordered by report date.
/// Each state keeps its own running sum; a date on which a state has no
/// count leaves that sum unchanged, so every cumulative column is a
/// non-decreasing step function.
#[must_use]
pub fn accumulate(counts: &[SnapshotCount]) -> Vec<CumulativeRow> {
    let mut pivot: BTreeMap<(&str, &str, i64), StateCounts> = BTreeMap::new();
    for count in counts {
        pivot
            .entry((
                count.apartment.as_str(),
                count.category.as_str(),
                count.report_date_ms,
            ))
            .or_default()
            .add(count.state, count.count);
    }

    let mut rows = Vec::with_capacity(pivot.len());
    let mut current: Option<(&str, &str)> = None;
    let mut running = StateCounts::default();

    for ((apartment, category, report_date_ms), here) in pivot {
        if current != Some((apartment, category)) {
            current = Some((apartment, category));
            running = StateCounts::default();
        }

        running.ok += here.ok;
        running.defect += here.defect;
        running.pending += here.pending;

        rows.push(CumulativeRow {
            apartment: apartment.to_string(),
            category: category.to_string(),
            report_date_ms,
            ok: here.ok,
            defect: here.defect,
            pending: here.pending,
            cumulative_ok: running.ok,
            cumulative_defect: running.defect,
            cumulative_pending: running.pending,
            cumulative_total: running.tracked_total(),
        });
    }

    rows
}

/// Largest `cumulative_total` seen per (apartment, category).
#[must_use]
pub fn compute_scope(rows: &[CumulativeRow]) -> BTreeMap<(String, String), u64> {
    let mut scope: BTreeMap<(String, String), u64> = BTreeMap::new();
    for row in rows {
        let entry = scope
            .entry((row.apartment.clone(), row.category.clone()))
            .or_insert(0);
        *entry = (*entry).max(row.cumulative_total);
    }
    scope
}

/// `cumulative_ok / total_scope * 100`, or `0.0` when there is no scope.
#[must_use]
pub fn completion_pct(cumulative_ok: u64, total_scope: u64) -> f64 {
    if total_scope == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (ok, scope) = (cumulative_ok as f64, total_scope as f64);
    ok / scope * 100.0
}

/// Full pipeline from snapshot counts to the progress table charts draw from.
#[must_use]
pub fn progress_table(counts: &[SnapshotCount]) -> Vec<ProgressRow> {
    let rows = accumulate(counts);
    let scope = compute_scope(&rows);

    rows.into_iter()
        .map(|row| {
            let total_scope = scope
                .get(&(row.apartment.clone(), row.category.clone()))
                .copied()
                .unwrap_or(0);
            ProgressRow {
                completion_pct: completion_pct(row.cumulative_ok, total_scope),
                total_scope,
                row,
            }
        })
        .collect()
}
