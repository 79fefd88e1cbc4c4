//! Today-window sync: the queries and mutations every refresh depends on.
//!
//! [`TodaySync`] never holds a credential. Callers pass one into every call
//! (or an optional one into [`TodaySync::refresh`]), so the session state
//! stays with whoever owns the [`CredentialStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use todayboard_core::{
    CalendarEvent, DashboardSnapshot, Task, TaskStatus, TimeWindow, format_due_date, todays_tasks,
};
use tracing::{debug, info, warn};

use crate::api::{CalendarApi, NewTask, TasksApi};
use crate::credential::{Credential, CredentialStore};
use crate::error::{ProviderError, ProviderResult};
use crate::google::{GoogleCalendar, GoogleConfig, GoogleTasks};

/// Fetches today's events and tasks, creates and completes tasks.
#[derive(Clone)]
pub struct TodaySync {
    calendar: Arc<dyn CalendarApi>,
    tasks: Arc<dyn TasksApi>,
    calendar_id: String,
    task_list_id: String,
    call_timeout: Duration,
}

impl std::fmt::Debug for TodaySync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodaySync")
            .field("calendar_id", &self.calendar_id)
            .field("task_list_id", &self.task_list_id)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl TodaySync {
    pub fn new(calendar: Arc<dyn CalendarApi>, tasks: Arc<dyn TasksApi>) -> Self {
        Self {
            calendar,
            tasks,
            calendar_id: GoogleConfig::DEFAULT_CALENDAR_ID.to_string(),
            task_list_id: GoogleConfig::DEFAULT_TASK_LIST_ID.to_string(),
            call_timeout: Duration::from_secs(GoogleConfig::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builds a sync service backed by the Google REST clients.
    pub fn google(config: &GoogleConfig) -> ProviderResult<Self> {
        let http_client = config.http_client()?;
        let calendar = GoogleCalendar::new(http_client.clone(), &config.calendar_base_url);
        let tasks = GoogleTasks::new(http_client, &config.tasks_base_url);

        Ok(Self::new(Arc::new(calendar), Arc::new(tasks))
            .with_calendar_id(&config.calendar_id)
            .with_task_list_id(&config.task_list_id)
            .with_call_timeout(config.timeout))
    }

    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    pub fn with_task_list_id(mut self, id: impl Into<String>) -> Self {
        self.task_list_id = id.into();
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn task_list_id(&self) -> &str {
        &self.task_list_id
    }

    /// Returns the events of the UTC day containing `now`, ordered by start.
    pub async fn fetch_todays_events(
        &self,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        credential.ensure_usable()?;
        let window = TimeWindow::utc_day(now);
        debug!(start = %window.start, end = %window.end, "querying calendar window");

        self.timed(
            "calendar list",
            self.calendar
                .list_events(credential, &self.calendar_id, &window),
        )
        .await
    }

    /// Returns the open tasks due on the UTC date of `now`, in remote order.
    pub async fn fetch_todays_tasks(
        &self,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> ProviderResult<Vec<Task>> {
        credential.ensure_usable()?;
        let all = self
            .timed(
                "tasks list",
                self.tasks.list_tasks(credential, &self.task_list_id),
            )
            .await?;
        let total = all.len();

        let today = todays_tasks(all, now.date_naive());
        debug!(total, today = today.len(), "filtered task list");
        Ok(today)
    }

    /// Marks a task completed. Completing an already completed task succeeds.
    pub async fn complete_task(&self, credential: &Credential, task_id: &str) -> ProviderResult<()> {
        if task_id.trim().is_empty() {
            return Err(ProviderError::validation("task id must not be empty"));
        }
        credential.ensure_usable()?;

        self.timed(
            "task update",
            self.tasks.update_task_status(
                credential,
                &self.task_list_id,
                task_id,
                TaskStatus::Completed,
            ),
        )
        .await?;

        info!(task_id, "completed task");
        Ok(())
    }

    /// Creates an open task due on the UTC date of `now` and returns its id.
    pub async fn create_task(
        &self,
        credential: &Credential,
        title: &str,
        now: DateTime<Utc>,
    ) -> ProviderResult<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ProviderError::validation("task title must not be empty"));
        }
        credential.ensure_usable()?;

        let task = NewTask {
            title: title.to_string(),
            due: format_due_date(now.date_naive()),
        };
        let id = self
            .timed(
                "task insert",
                self.tasks.insert_task(credential, &self.task_list_id, &task),
            )
            .await?;

        info!(task_id = %id, due = %task.due, "created task");
        Ok(id)
    }

    /// Computes one dashboard snapshot.
    ///
    /// A missing credential, or one the remote service rejects, yields an
    /// unauthenticated snapshot rather than an error. Remote failures fail
    /// the cycle.
    pub async fn refresh(
        &self,
        credential: Option<&Credential>,
        now: DateTime<Utc>,
    ) -> ProviderResult<DashboardSnapshot> {
        let Some(credential) = credential else {
            debug!("no credential, skipping sync");
            return Ok(DashboardSnapshot::unauthenticated(now));
        };

        let fetched = async {
            let events = self.fetch_todays_events(credential, now).await?;
            let tasks = self.fetch_todays_tasks(credential, now).await?;
            Ok::<_, ProviderError>((events, tasks))
        }
        .await;

        match fetched {
            Ok((events, tasks)) => Ok(DashboardSnapshot::authenticated(now, events, tasks)),
            Err(e) if e.is_auth() => {
                warn!(error = %e, "credential rejected, reporting unauthenticated");
                Ok(DashboardSnapshot::unauthenticated(now))
            }
            Err(e) => Err(e),
        }
    }

    /// [`refresh`](Self::refresh) with the credential currently in `store`.
    pub async fn refresh_from(
        &self,
        store: &CredentialStore,
        now: DateTime<Utc>,
    ) -> ProviderResult<DashboardSnapshot> {
        let credential = store.get();
        self.refresh(credential.as_ref(), now).await
    }

    async fn timed<T>(
        &self,
        operation: &str,
        call: impl Future<Output = ProviderResult<T>>,
    ) -> ProviderResult<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(format!(
                "{} did not complete within {:?}",
                operation, self.call_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, TimeZone};
    use todayboard_core::{EventTime, RawTask};

    use super::*;
    use crate::api::BoxFuture;
    use crate::error::ProviderErrorCode;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn credential() -> Credential {
        Credential::new("ya29.token", "https://oauth2.googleapis.com/token")
    }

    #[derive(Default)]
    struct FakeCalendar {
        events: Vec<CalendarEvent>,
        fail_with: Option<ProviderErrorCode>,
        hang: bool,
        calls: AtomicUsize,
        windows: Mutex<Vec<(String, TimeWindow)>>,
    }

    impl CalendarApi for FakeCalendar {
        fn list_events<'a>(
            &'a self,
            _credential: &'a Credential,
            calendar_id: &'a str,
            window: &'a TimeWindow,
        ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.windows
                    .lock()
                    .unwrap()
                    .push((calendar_id.to_string(), window.clone()));
                if self.hang {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
                match self.fail_with {
                    Some(code) => Err(ProviderError::new(code, "injected")),
                    None => Ok(self.events.clone()),
                }
            })
        }
    }

    /// In-memory task list that applies mutations like the remote service.
    #[derive(Default)]
    struct FakeTasks {
        tasks: Mutex<Vec<RawTask>>,
        fail_with: Option<ProviderErrorCode>,
        list_calls: AtomicUsize,
        update_calls: AtomicUsize,
        inserts: Mutex<Vec<(String, NewTask)>>,
    }

    impl FakeTasks {
        fn with_tasks(tasks: Vec<RawTask>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                ..Default::default()
            }
        }

        fn remote_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
                + self.update_calls.load(Ordering::SeqCst)
                + self.inserts.lock().unwrap().len()
        }
    }

    impl TasksApi for FakeTasks {
        fn list_tasks<'a>(
            &'a self,
            _credential: &'a Credential,
            _list_id: &'a str,
        ) -> BoxFuture<'a, ProviderResult<Vec<RawTask>>> {
            Box::pin(async move {
                self.list_calls.fetch_add(1, Ordering::SeqCst);
                match self.fail_with {
                    Some(code) => Err(ProviderError::new(code, "injected")),
                    None => Ok(self.tasks.lock().unwrap().clone()),
                }
            })
        }

        fn update_task_status<'a>(
            &'a self,
            _credential: &'a Credential,
            _list_id: &'a str,
            task_id: &'a str,
            status: TaskStatus,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                self.update_calls.fetch_add(1, Ordering::SeqCst);
                let mut tasks = self.tasks.lock().unwrap();
                match tasks.iter_mut().find(|t| t.id == task_id) {
                    Some(task) => {
                        task.status = status;
                        Ok(())
                    }
                    None => Err(ProviderError::not_found(task_id.to_string())),
                }
            })
        }

        fn insert_task<'a>(
            &'a self,
            _credential: &'a Credential,
            list_id: &'a str,
            task: &'a NewTask,
        ) -> BoxFuture<'a, ProviderResult<String>> {
            Box::pin(async move {
                let mut inserts = self.inserts.lock().unwrap();
                inserts.push((list_id.to_string(), task.clone()));
                let id = format!("new-{}", inserts.len());
                self.tasks.lock().unwrap().push(
                    RawTask::new(&id, &task.title).with_due(&task.due),
                );
                Ok(id)
            })
        }
    }

    fn sync_with(calendar: Arc<FakeCalendar>, tasks: Arc<FakeTasks>) -> TodaySync {
        TodaySync::new(calendar, tasks)
    }

    fn standup() -> CalendarEvent {
        CalendarEvent::new(
            "e1",
            Some("Standup".to_string()),
            EventTime::from_utc(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()),
            EventTime::from_utc(Utc.with_ymd_and_hms(2024, 3, 15, 9, 15, 0).unwrap()),
        )
    }

    #[tokio::test]
    async fn events_use_the_utc_day_window() {
        let calendar = Arc::new(FakeCalendar {
            events: vec![standup()],
            ..Default::default()
        });
        let sync = sync_with(calendar.clone(), Arc::new(FakeTasks::default()))
            .with_calendar_id("work@example.com");

        let events = sync.fetch_todays_events(&credential(), now()).await.unwrap();
        assert_eq!(events, vec![standup()]);

        let windows = calendar.windows.lock().unwrap();
        let (calendar_id, window) = &windows[0];
        assert_eq!(calendar_id, "work@example.com");
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn empty_calendar_is_valid() {
        let sync = sync_with(Arc::default(), Arc::default());
        assert!(sync.fetch_todays_events(&credential(), now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tasks_are_filtered_to_today() {
        let tasks = Arc::new(FakeTasks::with_tasks(vec![
            RawTask::new("t1", "Buy milk").with_due("2024-03-15T00:00:00.000Z"),
            RawTask::new("late", "Yesterday").with_due("2024-03-14T23:59:59.000Z"),
            RawTask::new("no-due", "Someday"),
            RawTask::new("bad", "Broken").with_due("tomorrow"),
            RawTask::new("done", "Done")
                .with_due("2024-03-15T00:00:00.000Z")
                .with_status(TaskStatus::Completed),
            RawTask::new("t2", "Call mom").with_due("2024-03-15T00:00:00.000Z"),
        ]));
        let sync = sync_with(Arc::default(), tasks);

        let today = sync.fetch_todays_tasks(&credential(), now()).await.unwrap();
        let ids: Vec<_> = today.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(today[0].due, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[tokio::test]
    async fn create_task_inserts_once_due_today() {
        let tasks = Arc::new(FakeTasks::default());
        let sync = sync_with(Arc::default(), tasks.clone()).with_task_list_id("list-1");

        let id = sync.create_task(&credential(), "Buy milk", now()).await.unwrap();
        assert_eq!(id, "new-1");

        let inserts = tasks.inserts.lock().unwrap();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].0, "list-1");
        assert_eq!(
            inserts[0].1,
            NewTask {
                title: "Buy milk".to_string(),
                due: "2024-03-15T00:00:00.000Z".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn created_task_shows_up_today() {
        let tasks = Arc::new(FakeTasks::default());
        let sync = sync_with(Arc::default(), tasks);

        let id = sync.create_task(&credential(), "  Water plants ", now()).await.unwrap();
        let today = sync.fetch_todays_tasks(&credential(), now()).await.unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, id);
        assert_eq!(today[0].title, "Water plants");
    }

    #[tokio::test]
    async fn empty_title_is_rejected_without_remote_call() {
        let tasks = Arc::new(FakeTasks::default());
        let sync = sync_with(Arc::default(), tasks.clone());

        for title in ["", "   "] {
            let err = sync.create_task(&credential(), title, now()).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(tasks.remote_calls(), 0);
    }

    #[tokio::test]
    async fn complete_task_is_idempotent() {
        let tasks = Arc::new(FakeTasks::with_tasks(vec![
            RawTask::new("t1", "Buy milk").with_due("2024-03-15T00:00:00.000Z"),
        ]));
        let sync = sync_with(Arc::default(), tasks.clone());

        sync.complete_task(&credential(), "t1").await.unwrap();
        let after_first = sync.fetch_todays_tasks(&credential(), now()).await.unwrap();

        sync.complete_task(&credential(), "t1").await.unwrap();
        let after_second = sync.fetch_todays_tasks(&credential(), now()).await.unwrap();

        assert!(after_first.is_empty());
        assert_eq!(after_first, after_second);
        assert_eq!(tasks.tasks.lock().unwrap()[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn complete_unknown_task_is_remote_error() {
        let sync = sync_with(Arc::default(), Arc::default());
        let err = sync.complete_task(&credential(), "missing").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn unusable_credential_makes_no_remote_call() {
        let calendar = Arc::new(FakeCalendar::default());
        let tasks = Arc::new(FakeTasks::default());
        let sync = sync_with(calendar.clone(), tasks.clone());
        let empty = Credential::new("", "");

        assert!(sync.fetch_todays_events(&empty, now()).await.unwrap_err().is_auth());
        assert!(sync.fetch_todays_tasks(&empty, now()).await.unwrap_err().is_auth());
        assert!(sync.complete_task(&empty, "t1").await.unwrap_err().is_auth());
        assert!(sync.create_task(&empty, "x", now()).await.unwrap_err().is_auth());

        assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
        assert_eq!(tasks.remote_calls(), 0);
    }

    #[tokio::test]
    async fn empty_store_is_unauthenticated_without_network() {
        let calendar = Arc::new(FakeCalendar::default());
        let tasks = Arc::new(FakeTasks::default());
        let sync = sync_with(calendar.clone(), tasks.clone());
        let store = CredentialStore::in_memory();

        let snapshot = sync.refresh_from(&store, now()).await.unwrap();
        assert!(!snapshot.authenticated);
        assert_eq!(snapshot.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
        assert_eq!(tasks.remote_calls(), 0);

        assert!(store.require().unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn refresh_composes_events_and_tasks() {
        let calendar = Arc::new(FakeCalendar {
            events: vec![standup()],
            ..Default::default()
        });
        let tasks = Arc::new(FakeTasks::with_tasks(vec![
            RawTask::new("t1", "Buy milk").with_due("2024-03-15T00:00:00.000Z"),
        ]));
        let sync = sync_with(calendar, tasks);
        let store = CredentialStore::in_memory();
        store.set(credential()).unwrap();

        let snapshot = sync.refresh_from(&store, now()).await.unwrap();
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.generated_at, now());
    }

    #[tokio::test]
    async fn rejected_token_reports_unauthenticated() {
        let calendar = Arc::new(FakeCalendar {
            fail_with: Some(ProviderErrorCode::AuthenticationFailed),
            ..Default::default()
        });
        let sync = sync_with(calendar, Arc::default());

        let snapshot = sync.refresh(Some(&credential()), now()).await.unwrap();
        assert!(!snapshot.authenticated);
    }

    #[tokio::test]
    async fn remote_failure_fails_the_cycle() {
        let tasks = Arc::new(FakeTasks {
            fail_with: Some(ProviderErrorCode::ServerError),
            ..Default::default()
        });
        let sync = sync_with(Arc::default(), tasks);

        let err = sync.refresh(Some(&credential()), now()).await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test(start_paused = true)]
    async fn calls_time_out() {
        let calendar = Arc::new(FakeCalendar {
            hang: true,
            ..Default::default()
        });
        let sync = sync_with(calendar, Arc::default()).with_call_timeout(Duration::from_secs(5));

        let err = sync.fetch_todays_events(&credential(), now()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Timeout);
    }

    #[test]
    fn google_sync_uses_config() {
        let config = GoogleConfig::new(crate::google::OAuthCredentials::new(
            "id.apps.googleusercontent.com",
            "secret",
        ))
        .with_task_list_id("list-9")
        .with_timeout(Duration::from_secs(7));

        let sync = TodaySync::google(&config).unwrap();
        assert_eq!(sync.task_list_id(), "list-9");
        assert_eq!(sync.call_timeout, Duration::from_secs(7));
    }
}
