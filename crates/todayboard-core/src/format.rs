//! Output formatting for dashboard snapshots.
//!
//! - **TTY**: human-readable terminal output
//! - **JSON**: machine-readable output of the whole snapshot

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::snapshot::DashboardSnapshot;

/// Shown when the snapshot has no credential behind it.
pub const NOT_AUTHENTICATED_TEXT: &str = "Not authenticated.";
/// Shown when there are no events today.
pub const NO_EVENTS_TEXT: &str = "No events today.";
/// Shown when there are no open tasks due today.
pub const NO_TASKS_TEXT: &str = "No tasks for today.";

/// The output format for snapshot display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Renders a snapshot for the terminal.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    if !snapshot.authenticated {
        out.push_str(NOT_AUTHENTICATED_TEXT);
        out.push('\n');
        return out;
    }

    let _ = writeln!(out, "Today's events ({})", snapshot.date.format("%Y-%m-%d"));
    if snapshot.events.is_empty() {
        let _ = writeln!(out, "  {}", NO_EVENTS_TEXT);
    }
    for event in &snapshot.events {
        let _ = writeln!(out, "  • {}", event.title);
        let _ = writeln!(out, "    {} - {}", event.start, event.end);
    }

    out.push('\n');
    out.push_str("Today's tasks\n");
    if snapshot.tasks.is_empty() {
        let _ = writeln!(out, "  {}", NO_TASKS_TEXT);
    }
    for task in &snapshot.tasks {
        let _ = writeln!(out, "  [ ] {}  ({})", task.title, task.id);
    }

    out
}

/// Renders a snapshot as pretty-printed JSON.
pub fn render_json(snapshot: &DashboardSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}
