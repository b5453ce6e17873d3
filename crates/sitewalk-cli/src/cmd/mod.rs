pub mod charts;
pub mod completions;
pub mod defects;
pub mod find_report;
pub mod normalize;
pub mod progress;
pub mod reports;
pub mod status;

use anyhow::{Context, Result};
use clap::Args;
use rusqlite::Connection;
use sitewalk_core::aggregate::ReportFilter;
use sitewalk_core::config::EffectiveConfig;
use sitewalk_core::db::{self, query};
use sitewalk_core::model::date::parse_date_ms;
use tracing::warn;

/// Report selection flags shared by the aggregation commands.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only this apartment number.
    #[arg(long, short = 'a', value_name = "NUMBER")]
    pub apartment: Option<String>,

    /// Only reports on or after this date (YYYY-MM-DD or epoch milliseconds).
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,

    /// Keep reports flagged as having processing errors.
    #[arg(long)]
    pub include_errored: bool,
}

impl FilterArgs {
    /// Build the report filter, falling back to `[reports]` in the project
    /// config for the error flag.
    pub fn to_filter(&self, config: &EffectiveConfig) -> Result<ReportFilter> {
        let mut filter = ReportFilter::default()
            .including_errored(self.include_errored || config.project.reports.include_errored);
        if let Some(apartment) = &self.apartment {
            filter = filter.for_apartment(apartment.clone());
        }
        if let Some(raw) = &self.since {
            let since =
                parse_date_ms(raw).with_context(|| format!("invalid --since value '{raw}'"))?;
            filter = filter.since(since);
        }
        Ok(filter)
    }
}

/// Open the configured inspection store.
pub fn open_store(config: &EffectiveConfig) -> Result<Connection> {
    db::open_store(&config.store_path)
}

/// `false` (with a warning) when the filter names an apartment the store
/// does not know. Callers then report an empty result.
pub fn apartment_known(conn: &Connection, filter: &ReportFilter) -> Result<bool> {
    let Some(apartment) = filter.apartment.as_deref() else {
        return Ok(true);
    };
    if query::apartment_exists(conn, apartment)? {
        return Ok(true);
    }
    warn!(apartment, "apartment not found in store");
    Ok(false)
}
