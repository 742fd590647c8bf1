//! Time utility functions
//!
//! Calendar-day helpers shared by the metrics engine and the planner.

use crate::error::{Result, SmartTaskError};
use chrono::{DateTime, NaiveDate, Utc};

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
/// Returns InvalidInput if the string is not a valid calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        SmartTaskError::InvalidInput(format!(
            "Invalid date '{}'. Expected YYYY-MM-DD, e.g. 2025-06-15",
            input
        ))
    })
}

/// Whether a UTC timestamp falls on the given calendar day (UTC).
pub fn same_calendar_day(timestamp: DateTime<Utc>, day: NaiveDate) -> bool {
    timestamp.date_naive() == day
}
