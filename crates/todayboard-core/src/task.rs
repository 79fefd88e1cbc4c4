//! Tasks and the "due today" filter.
//!
//! The Tasks API has no server-side "due today" query, so the full list is
//! fetched and filtered here. The filter is pure: it takes the remote list and
//! the current UTC date and never fails; tasks whose due date cannot be parsed
//! are logged and skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::due::parse_due_date;

/// Completion state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// The task is still open.
    #[default]
    NeedsAction,
    /// The task has been completed.
    Completed,
}

impl TaskStatus {
    /// Returns the wire name used by the Tasks API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsAction => "needsAction",
            Self::Completed => "completed",
        }
    }
}

/// A task as listed by the remote service, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTask {
    pub id: String,
    pub title: String,
    /// Unparsed RFC3339 due timestamp.
    pub due: Option<String>,
    pub status: TaskStatus,
}

impl RawTask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due: None,
            status: TaskStatus::NeedsAction,
        }
    }

    pub fn with_due(mut self, due: impl Into<String>) -> Self {
        self.due = Some(due.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// A task shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable remote identifier; the only key used to correlate UI state.
    pub id: String,
    pub title: String,
    pub due: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl Task {
    /// Returns true if the task is open and due on `today`.
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.due == Some(today) && self.status != TaskStatus::Completed
    }
}

/// Selects the open tasks due on `today`, preserving remote order.
///
/// Tasks without a due date are skipped silently; tasks with a malformed or
/// non-UTC due date are skipped with a warning.
pub fn todays_tasks<I>(tasks: I, today: NaiveDate) -> Vec<Task>
where
    I: IntoIterator<Item = RawTask>,
{
    tasks
        .into_iter()
        .filter_map(|raw| {
            let due = match raw.due.as_deref() {
                Some(value) => match parse_due_date(value) {
                    Ok(date) => date,
                    Err(e) => {
                        warn!(task_id = %raw.id, due = value, error = %e, "skipping task with unusable due date");
                        return None;
                    }
                },
                None => return None,
            };

            let task = Task {
                id: raw.id,
                title: raw.title,
                due: Some(due),
                status: raw.status,
            };
            task.is_due_on(today).then_some(task)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn includes_open_task_due_today() {
        let tasks = vec![RawTask::new("t1", "Buy milk").with_due("2024-03-15T00:00:00.000Z")];
        let result = todays_tasks(tasks, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Buy milk");
        assert_eq!(result[0].due, Some(today()));
    }

    #[test]
    fn excludes_tasks_due_other_days() {
        let tasks = vec![
            RawTask::new("yesterday", "a").with_due("2024-03-14T23:59:59.000Z"),
            RawTask::new("tomorrow", "b").with_due("2024-03-16T00:00:00.000Z"),
            RawTask::new("last-year", "c").with_due("2023-03-15T00:00:00.000Z"),
        ];
        assert!(todays_tasks(tasks, today()).is_empty());
    }

    #[test]
    fn excludes_completed_tasks() {
        let tasks = vec![
            RawTask::new("done", "a")
                .with_due("2024-03-15T00:00:00.000Z")
                .with_status(TaskStatus::Completed),
            RawTask::new("done-old", "b")
                .with_due("2024-03-01T00:00:00.000Z")
                .with_status(TaskStatus::Completed),
        ];
        assert!(todays_tasks(tasks, today()).is_empty());
    }

    #[test]
    fn excludes_tasks_without_due() {
        let tasks = vec![RawTask::new("no-due", "a")];
        assert!(todays_tasks(tasks, today()).is_empty());
    }

    #[test]
    fn malformed_due_does_not_abort_the_rest() {
        let tasks = vec![
            RawTask::new("t1", "first").with_due("2024-03-15T00:00:00.000Z"),
            RawTask::new("bad", "garbage").with_due("not-a-date"),
            RawTask::new("offset", "shifted").with_due("2024-03-15T00:00:00.000+01:00"),
            RawTask::new("t2", "second").with_due("2024-03-15T00:00:00.000Z"),
        ];
        assert_eq!(ids(&todays_tasks(tasks, today())), vec!["t1", "t2"]);
    }

    #[test]
    fn preserves_remote_order_without_duplicates() {
        let tasks = vec![
            RawTask::new("c", "c").with_due("2024-03-15T00:00:00.000Z"),
            RawTask::new("a", "a").with_due("2024-03-15T00:00:00.000Z"),
            RawTask::new("b", "b").with_due("2024-03-15T00:00:00.000Z"),
        ];
        assert_eq!(ids(&todays_tasks(tasks, today())), vec!["c", "a", "b"]);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(TaskStatus::NeedsAction.as_str(), "needsAction");
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
