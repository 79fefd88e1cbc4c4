//! Core types: UTC day window, events, tasks, today filter, rendering

pub mod due;
pub mod event;
pub mod format;
pub mod snapshot;
pub mod task;
pub mod time;
pub mod tracing;

pub use due::{DueDateError, format_due_date, parse_due_date};
pub use event::{CalendarEvent, UNTITLED_EVENT};
pub use format::{
    NO_EVENTS_TEXT, NO_TASKS_TEXT, NOT_AUTHENTICATED_TEXT, OutputFormat, render_json, render_text,
};
pub use snapshot::DashboardSnapshot;
pub use task::{RawTask, Task, TaskStatus, todays_tasks};
pub use time::{EventTime, TimeWindow};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
