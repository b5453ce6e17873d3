use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use super::ReportFilter;
use crate::model::{CanonicalState, SnapshotRow};

/// Count of items in one canonical state for an apartment, category and
/// report date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotCount {
    pub apartment: String,
    pub category: String,
    pub report_date_ms: i64,
    pub state: CanonicalState,
    pub count: u64,
}

/// Count tracked items per (apartment, report date, category, state).
///
/// Rows rejected by `filter` and rows whose status maps to
/// [`CanonicalState::Info`] are skipped. Only nonzero counts are emitted,
/// ordered by apartment, report date, category and state.
#[must_use]
pub fn build_snapshot_counts(items: &[SnapshotRow], filter: &ReportFilter) -> Vec<SnapshotCount> {
    let mut counts: BTreeMap<(&str, i64, &str, CanonicalState), u64> = BTreeMap::new();
    let mut skipped_info = 0_usize;

    for row in items.iter().filter(|row| filter.admits(row)) {
        let state = row.state();
        if !state.is_tracked() {
            trace!(status = %row.status, report = %row.report_id, "status outside progress table");
            skipped_info += 1;
            continue;
        }

        *counts
            .entry((
                row.apartment.as_str(),
                row.report_date_ms,
                row.category.as_str(),
                state,
            ))
            .or_insert(0) += 1;
    }

    if skipped_info > 0 {
        debug!(skipped_info, "info-state items excluded from snapshot counts");
    }

    counts
        .into_iter()
        .map(
            |((apartment, report_date_ms, category, state), count)| SnapshotCount {
                apartment: apartment.to_string(),
                category: category.to_string(),
                report_date_ms,
                state,
                count,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::item;

    fn count(category: &str, state: CanonicalState, count: u64) -> (String, CanonicalState, u64) {
        (category.to_string(), state, count)
    }

    fn flatten(counts: &[SnapshotCount]) -> Vec<(String, CanonicalState, u64)> {
        counts
            .iter()
            .map(|c| (c.category.clone(), c.state, c.count))
            .collect()
    }

    #[test]
    fn single_report_counts_each_state() {
        let items = vec![
            item("7", 100, "Plumbing", "COMPLETED"),
            item("7", 100, "Plumbing", "DEFECT"),
            item("7", 100, "Plumbing", "IN_PROGRESS"),
        ];

        let counts = build_snapshot_counts(&items, &ReportFilter::default());
        assert_eq!(
            flatten(&counts),
            vec![
                count("Plumbing", CanonicalState::Ok, 1),
                count("Plumbing", CanonicalState::Defect, 1),
                count("Plumbing", CanonicalState::Pending, 1),
            ]
        );
        assert!(counts.iter().all(|c| c.apartment == "7" && c.report_date_ms == 100));
    }

    #[test]
    fn info_statuses_are_dropped() {
        let items = vec![
            item("7", 100, "Plumbing", "UNKNOWN_CODE"),
            item("7", 100, "Plumbing", "HANDLED"),
            item("7", 100, "Plumbing", "NOT_OK"),
        ];

        let counts = build_snapshot_counts(&items, &ReportFilter::default());
        assert_eq!(flatten(&counts), vec![count("Plumbing", CanonicalState::Defect, 1)]);
    }

    #[test]
    fn errored_reports_are_excluded_by_default() {
        let mut errored = item("7", 200, "Plumbing", "COMPLETED");
        errored.report_has_errors = Some(true);
        let items = vec![item("7", 100, "Plumbing", "COMPLETED"), errored];

        let counts = build_snapshot_counts(&items, &ReportFilter::default());
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].report_date_ms, 100);

        let all = build_snapshot_counts(&items, &ReportFilter::default().including_errored(true));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn per_report_sum_matches_tracked_items() {
        let items = vec![
            item("7", 100, "Plumbing", "COMPLETED"),
            item("7", 100, "Electrical", "COMPLETED_OK"),
            item("7", 100, "Electrical", "PENDING"),
            item("7", 100, "Electrical", "NOT_STARTED"),
            item("8", 100, "Electrical", "DEFECT"),
        ];

        let counts = build_snapshot_counts(&items, &ReportFilter::default());
        let apt7: u64 = counts
            .iter()
            .filter(|c| c.apartment == "7")
            .map(|c| c.count)
            .sum();
        assert_eq!(apt7, 3);
    }

    #[test]
    fn output_is_ordered_by_apartment_then_date() {
        let items = vec![
            item("8", 200, "B", "DEFECT"),
            item("7", 200, "A", "DEFECT"),
            item("7", 100, "B", "DEFECT"),
            item("7", 100, "A", "PENDING"),
        ];

        let counts = build_snapshot_counts(&items, &ReportFilter::default());
        let order: Vec<(String, i64, String)> = counts
            .into_iter()
            .map(|c| (c.apartment, c.report_date_ms, c.category))
            .collect();
        assert_eq!(
            order,
            vec![
                ("7".to_string(), 100, "A".to_string()),
                ("7".to_string(), 100, "B".to_string()),
                ("7".to_string(), 200, "A".to_string()),
                ("8".to_string(), 200, "B".to_string()),
            ]
        );
    }
}
