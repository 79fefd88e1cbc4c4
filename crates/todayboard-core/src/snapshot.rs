//! The value handed to the presentation layer after each refresh.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;
use crate::task::Task;

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Whether a usable credential was present and accepted.
    pub authenticated: bool,
    /// The UTC date the snapshot was computed for.
    pub date: NaiveDate,
    /// Today's events, ordered by start time.
    pub events: Vec<CalendarEvent>,
    /// Today's open tasks, in remote order.
    pub tasks: Vec<Task>,
    /// When the snapshot was produced.
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// A snapshot for an authenticated session.
    pub fn authenticated(
        now: DateTime<Utc>,
        events: Vec<CalendarEvent>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            authenticated: true,
            date: now.date_naive(),
            events,
            tasks,
            generated_at: now,
        }
    }

    /// A snapshot signalling that the user must log in.
    pub fn unauthenticated(now: DateTime<Utc>) -> Self {
        Self {
            authenticated: false,
            date: now.date_naive(),
            events: Vec::new(),
            tasks: Vec::new(),
            generated_at: now,
        }
    }
}
