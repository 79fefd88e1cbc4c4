//! Calendar events shown on the dashboard.

use serde::{Deserialize, Serialize};

use crate::time::EventTime;

/// Title used when the remote event has no summary.
pub const UNTITLED_EVENT: &str = "untitled";

/// A calendar event falling inside the UTC day window.
///
/// Events are read-only and fetched fresh on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Remote event identifier.
    pub id: String,
    /// Event title, [`UNTITLED_EVENT`] when the remote summary is missing or blank.
    pub title: String,
    /// Event start.
    pub start: EventTime,
    /// Event end.
    pub end: EventTime,
}

impl CalendarEvent {
    /// Creates an event, substituting the placeholder for a missing title.
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        start: EventTime,
        end: EventTime,
    ) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_EVENT.to_string());

        Self {
            id: id.into(),
            title,
            start,
            end,
        }
    }

    /// Returns true for all-day events.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }
}
