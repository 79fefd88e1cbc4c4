//! Remote API seams.
//!
//! [`CalendarApi`] and [`TasksApi`] are the only points where the sync layer
//! reaches the network. The Google implementations live in
//! [`crate::google`]; tests plug in in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use todayboard_core::{CalendarEvent, RawTask, TaskStatus, TimeWindow};

use crate::credential::Credential;
use crate::error::ProviderResult;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A task to be inserted into a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    /// RFC3339 due timestamp, e.g. `2024-03-15T00:00:00.000Z`.
    pub due: String,
}

/// Read access to calendar events.
pub trait CalendarApi: Send + Sync {
    /// Lists the single (expanded) events of `calendar_id` starting within
    /// `window`, ordered by start time.
    fn list_events<'a>(
        &'a self,
        credential: &'a Credential,
        calendar_id: &'a str,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>>;
}

/// Read and write access to a task list.
pub trait TasksApi: Send + Sync {
    /// Lists every task of `list_id`, in remote order.
    fn list_tasks<'a>(
        &'a self,
        credential: &'a Credential,
        list_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawTask>>>;

    /// Sets the status of one task.
    fn update_task_status<'a>(
        &'a self,
        credential: &'a Credential,
        list_id: &'a str,
        task_id: &'a str,
        status: TaskStatus,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Inserts a task and returns its remote id.
    fn insert_task<'a>(
        &'a self,
        credential: &'a Credential,
        list_id: &'a str,
        task: &'a NewTask,
    ) -> BoxFuture<'a, ProviderResult<String>>;
}
