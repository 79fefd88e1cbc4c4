//! Task due-date handling.
//!
//! Google Tasks stores due dates as RFC3339 timestamps pinned to midnight UTC
//! (`2024-03-15T00:00:00.000Z`); only the date portion is meaningful.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

/// A task's `due` field could not be turned into a UTC calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DueDateError {
    /// The value is not an RFC3339 timestamp.
    #[error("malformed due date {value:?}: {reason}")]
    Malformed { value: String, reason: String },

    /// The timestamp carries a non-zero UTC offset.
    #[error("due date {value:?} is not UTC (offset {offset_secs}s)")]
    NonUtcOffset { value: String, offset_secs: i32 },
}

/// Parses a task `due` value into its UTC calendar date.
///
/// Only zero-offset timestamps (`Z` or `+00:00`) are accepted.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, DueDateError> {
    let parsed = DateTime::parse_from_rfc3339(value.trim()).map_err(|e| DueDateError::Malformed {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    let offset_secs = parsed.offset().local_minus_utc();
    if offset_secs != 0 {
        return Err(DueDateError::NonUtcOffset {
            value: value.to_string(),
            offset_secs,
        });
    }

    Ok(parsed.date_naive())
}

/// Formats a date as a Google Tasks `due` value (midnight UTC).
pub fn format_due_date(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}
