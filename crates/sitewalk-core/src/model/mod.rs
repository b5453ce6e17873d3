//! Domain types for inspection reports and their work items.

pub mod category;
pub mod date;
pub mod record;
pub mod status;

pub use category::WorkCategory;
pub use record::{ApartmentRow, ItemKey, ItemSample, ReportRow, SnapshotRow};
pub use status::{CanonicalState, WorkStatus, map_status};
