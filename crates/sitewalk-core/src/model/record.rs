//! Rows read from the inspection store.

use serde::Serialize;

use super::status::{CanonicalState, map_status};

/// Location assumed for items filed without one.
pub const DEFAULT_LOCATION: &str = "General";

/// One inspection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub file_name: Option<String>,
    pub report_date_ms: i64,
    pub has_errors: Option<bool>,
}

impl ReportRow {
    /// Only an explicit `true` marks a report as errored; NULL does not.
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.has_errors == Some(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApartmentRow {
    pub id: String,
    pub number: String,
}

/// A work item joined with its owning report and apartment.
///
/// This is the flat input the aggregator works from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRow {
    pub report_id: String,
    pub report_date_ms: i64,
    pub report_has_errors: Option<bool>,
    pub apartment: String,
    pub category: String,
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl SnapshotRow {
    #[must_use]
    pub fn state(&self) -> CanonicalState {
        map_status(&self.status)
    }

    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey {
            apartment: self.apartment.clone(),
            category: self.category.clone(),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

/// Identity of a finding within one report's snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemKey {
    pub apartment: String,
    pub category: String,
    pub location: String,
    pub description: String,
}

/// A handful of fields used when eyeballing a report's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSample {
    pub category: String,
    pub description: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}
