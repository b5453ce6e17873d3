//! Report timestamps are stored as epoch milliseconds.

use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseDateError {
    #[error("empty date value")]
    Empty,
    #[error("'{0}' is neither YYYY-MM-DD nor epoch milliseconds")]
    Unrecognized(String),
}

/// Parse `YYYY-MM-DD` (UTC midnight) or raw epoch milliseconds.
///
/// # Errors
///
/// Returns [`ParseDateError`] when the value matches neither form.
pub fn parse_date_ms(raw: &str) -> Result<i64, ParseDateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseDateError::Empty);
    }

    if let Ok(ms) = trimmed.parse::<i64>() {
        return Ok(ms);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
        .ok_or_else(|| ParseDateError::Unrecognized(trimmed.to_string()))
}

#[must_use]
pub fn to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// `YYYY-MM-DD` for a stored timestamp, or the raw number if out of range.
#[must_use]
pub fn date_label(ms: i64) -> String {
    to_datetime(ms).map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}
