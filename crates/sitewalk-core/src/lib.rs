//! sitewalk-core library.
//!
//! Read path over an apartment inspection store plus the snapshot progress
//! aggregator that turns per-report work item states into cumulative
//! per-apartment, per-category completion figures.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types where appropriate.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Store access**: every function takes the connection it reads from; there
//!   is no process-wide handle.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use aggregate::{
    CumulativeRow, ProgressRow, ReportFilter, SnapshotCount, accumulate, build_snapshot_counts,
    completion_pct, compute_scope, progress_table,
};
pub use model::status::{CanonicalState, map_status};
