use proptest::prelude::*;
use sitewalk_core::model::SnapshotRow;

pub const STATUS_CODES: [&str; 10] = [
    "COMPLETED",
    "COMPLETED_OK",
    "DEFECT",
    "NOT_OK",
    "IN_PROGRESS",
    "PENDING",
    "HANDLED",
    "NOT_STARTED",
    "UNKNOWN_CODE",
    "",
];

pub fn arb_status() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        4 => prop::sample::select(STATUS_CODES.to_vec()).prop_map(str::to_string),
        1 => "[A-Za-z_]{0,12}",
    ]
}

pub fn arb_row() -> impl Strategy<Value = SnapshotRow> + Clone {
    (
        prop::sample::select(vec!["7", "8", "12"]),
        0i64..8,
        prop::sample::select(vec!["Plumbing", "Paint", "Electrical"]),
        arb_status(),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(apartment, day, category, status, has_errors)| SnapshotRow {
            report_id: format!("r{day}"),
            report_date_ms: day * 86_400_000,
            report_has_errors: has_errors,
            apartment: apartment.to_string(),
            category: category.to_string(),
            status,
            location: None,
            description: None,
        })
}

pub fn arb_rows() -> impl Strategy<Value = Vec<SnapshotRow>> + Clone {
    prop::collection::vec(arb_row(), 0..120)
}
