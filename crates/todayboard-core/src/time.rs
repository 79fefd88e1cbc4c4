//! Time types for the dashboard.
//!
//! This module provides [`EventTime`] for representing event start/end times
//! (which may be either a specific datetime or an all-day date), and
//! [`TimeWindow`] for the UTC day window used to bound "today".

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the start or end of a calendar event.
///
/// Calendar events carry one of two kinds of times:
/// - **DateTime**: a specific point in time, stored as UTC
/// - **AllDay**: a date without a specific time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventTime {
    /// A specific datetime, stored in UTC.
    DateTime(DateTime<Utc>),
    /// An all-day event date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a new `EventTime::DateTime` from a UTC datetime.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Converts to a UTC datetime for comparison purposes.
    ///
    /// For all-day events, returns midnight UTC on that date.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::AllDay(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Returns the date portion of this event time.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::AllDay(date) => *date,
        }
    }
}

impl fmt::Display for EventTime {
    /// Timestamps render as RFC3339, all-day dates as `YYYY-MM-DD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::AllDay(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc_datetime().cmp(&other.to_utc_datetime())
    }
}

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates the UTC day window `[date 00:00:00Z, date + 24h)`.
    pub fn for_utc_date(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Duration::hours(24),
        }
    }

    /// Creates the UTC day window containing `now`.
    pub fn utc_day(now: DateTime<Utc>) -> Self {
        Self::for_utc_date(now.date_naive())
    }

    /// Returns the calendar date the window starts on.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn all_day_compares_at_midnight() {
            let et1 = EventTime::from_utc(utc(2024, 3, 15, 10, 0, 0));
            let et2 = EventTime::from_utc(utc(2024, 3, 15, 11, 0, 0));
            let et3 = EventTime::from_date(date(2024, 3, 15));

            assert!(et3 < et1);
            assert!(et1 < et2);
            assert_eq!(et3.to_utc_datetime(), utc(2024, 3, 15, 0, 0, 0));
        }

        #[test]
        fn date_extraction() {
            let et = EventTime::from_utc(utc(2024, 3, 15, 23, 59, 0));
            assert_eq!(et.date(), date(2024, 3, 15));
            assert!(!et.is_all_day());

            let et = EventTime::from_date(date(2024, 3, 16));
            assert_eq!(et.date(), date(2024, 3, 16));
            assert!(et.is_all_day());
        }

        #[test]
        fn display() {
            let et = EventTime::from_utc(utc(2024, 3, 15, 9, 30, 0));
            assert_eq!(et.to_string(), "2024-03-15T09:30:00+00:00");

            let et = EventTime::from_date(date(2024, 3, 15));
            assert_eq!(et.to_string(), "2024-03-15");
        }

        #[test]
        fn serde_tagging() {
            let et = EventTime::from_date(date(2024, 3, 15));
            let json = serde_json::to_value(&et).unwrap();
            assert_eq!(json["type"], "all_day");
            assert_eq!(json["value"], "2024-03-15");
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn utc_day_from_mid_morning() {
            let window = TimeWindow::utc_day(utc(2024, 3, 15, 10, 0, 0));
            assert_eq!(window.start, utc(2024, 3, 15, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 16, 0, 0, 0));
            assert_eq!(window.duration(), Duration::hours(24));
            assert_eq!(window.date(), date(2024, 3, 15));
        }

        #[test]
        fn utc_day_at_boundaries() {
            let window = TimeWindow::utc_day(utc(2024, 3, 15, 0, 0, 0));
            assert_eq!(window.start, utc(2024, 3, 15, 0, 0, 0));

            let window = TimeWindow::utc_day(utc(2024, 3, 15, 23, 59, 59));
            assert_eq!(window.end, utc(2024, 3, 16, 0, 0, 0));
        }

        #[test]
        fn utc_day_crosses_month_and_leap_day() {
            let window = TimeWindow::utc_day(utc(2024, 2, 29, 12, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 1, 0, 0, 0));

            let window = TimeWindow::utc_day(utc(2024, 12, 31, 18, 0, 0));
            assert_eq!(window.end, utc(2025, 1, 1, 0, 0, 0));
        }

        #[test]
        fn contains_is_half_open() {
            let window = TimeWindow::utc_day(utc(2024, 3, 15, 10, 0, 0));

            assert!(window.contains(utc(2024, 3, 15, 0, 0, 0)));
            assert!(window.contains(utc(2024, 3, 15, 23, 59, 59)));
            assert!(!window.contains(utc(2024, 3, 16, 0, 0, 0)));
            assert!(!window.contains(utc(2024, 3, 14, 23, 59, 59)));
        }
    }
}
