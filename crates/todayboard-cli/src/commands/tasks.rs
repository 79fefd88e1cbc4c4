//! Task actions: add a task due today, mark a task completed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use todayboard_core::{OutputFormat, TaskStatus};
use todayboard_providers::{CredentialStore, TodaySync};

use super::{google_sync, open_store};
use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::ClientResult;

/// What a task action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub id: String,
    pub status: TaskStatus,
}

impl TaskOutcome {
    fn render(&self, verb: &str, format: OutputFormat) -> ClientResult<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string(self)?),
            OutputFormat::Tty => Ok(format!("{} task {}", verb, self.id)),
        }
    }
}

/// `todayboard add <title>`
pub async fn add(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
    title: &str,
    format: OutputFormat,
) -> ClientResult<()> {
    let store = open_store(config)?;
    let sync = google_sync(config, overrides)?;
    let outcome = add_task(&sync, &store, title, Utc::now()).await?;
    println!("{}", outcome.render("Added", format)?);
    Ok(())
}

/// `todayboard done <task_id>`
pub async fn done(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
    task_id: &str,
    format: OutputFormat,
) -> ClientResult<()> {
    let store = open_store(config)?;
    let sync = google_sync(config, overrides)?;
    let outcome = complete_task(&sync, &store, task_id).await?;
    println!("{}", outcome.render("Completed", format)?);
    Ok(())
}

pub(crate) async fn add_task(
    sync: &TodaySync,
    store: &CredentialStore,
    title: &str,
    now: DateTime<Utc>,
) -> ClientResult<TaskOutcome> {
    let credential = store.require()?;
    let id = sync.create_task(&credential, title, now).await?;
    Ok(TaskOutcome {
        id,
        status: TaskStatus::NeedsAction,
    })
}

pub(crate) async fn complete_task(
    sync: &TodaySync,
    store: &CredentialStore,
    task_id: &str,
) -> ClientResult<TaskOutcome> {
    let credential = store.require()?;
    sync.complete_task(&credential, task_id).await?;
    Ok(TaskOutcome {
        id: task_id.to_string(),
        status: TaskStatus::Completed,
    })
}
