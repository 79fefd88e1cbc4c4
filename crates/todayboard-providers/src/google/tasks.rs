//! Google Tasks v1 client.

use serde::{Deserialize, Serialize};
use todayboard_core::{RawTask, TaskStatus};
use tracing::debug;

use crate::api::{BoxFuture, NewTask, TasksApi};
use crate::credential::Credential;
use crate::error::{ProviderError, ProviderResult};

use super::http::{check_status, read_json, send_error};

const API: &str = "tasks";

const PAGE_SIZE: u32 = 100;

/// Reads and writes tasks through the Google Tasks REST API.
#[derive(Debug, Clone)]
pub struct GoogleTasks {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleTasks {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn tasks_url(&self, list_id: &str) -> String {
        format!(
            "{}/lists/{}/tasks",
            self.base_url,
            urlencoding::encode(list_id)
        )
    }

    async fn fetch_tasks(&self, credential: &Credential, list_id: &str) -> ProviderResult<Vec<RawTask>> {
        let url = self.tasks_url(list_id);
        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&credential.access_token)
                .query(&[("maxResults", PAGE_SIZE.to_string())]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(|e| send_error(e, API))?;
            let response = check_status(response, API).await?;
            let page: TaskListResponse = read_json(response, API).await?;

            tasks.extend(page.items.into_iter().filter_map(convert_task));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = tasks.len(), list_id, "fetched task list");
        Ok(tasks)
    }

    async fn patch_status(
        &self,
        credential: &Credential,
        list_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> ProviderResult<()> {
        let url = format!("{}/{}", self.tasks_url(list_id), urlencoding::encode(task_id));

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&credential.access_token)
            .json(&StatusPatch::new(status))
            .send()
            .await
            .map_err(|e| send_error(e, API))?;
        check_status(response, API).await?;

        debug!(task_id, status = status.as_str(), "updated task status");
        Ok(())
    }

    async fn post_task(
        &self,
        credential: &Credential,
        list_id: &str,
        task: &NewTask,
    ) -> ProviderResult<String> {
        let body = InsertBody {
            title: &task.title,
            due: &task.due,
            status: TaskStatus::NeedsAction.as_str(),
        };

        let response = self
            .http_client
            .post(self.tasks_url(list_id))
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, API))?;
        let response = check_status(response, API).await?;
        let created: ApiTask = read_json(response, API).await?;

        created.id.ok_or_else(|| {
            ProviderError::invalid_response("inserted task has no id").with_provider(API)
        })
    }
}

impl TasksApi for GoogleTasks {
    fn list_tasks<'a>(
        &'a self,
        credential: &'a Credential,
        list_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawTask>>> {
        Box::pin(self.fetch_tasks(credential, list_id))
    }

    fn update_task_status<'a>(
        &'a self,
        credential: &'a Credential,
        list_id: &'a str,
        task_id: &'a str,
        status: TaskStatus,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.patch_status(credential, list_id, task_id, status))
    }

    fn insert_task<'a>(
        &'a self,
        credential: &'a Credential,
        list_id: &'a str,
        task: &'a NewTask,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.post_task(credential, list_id, task))
    }
}

fn convert_task(task: ApiTask) -> Option<RawTask> {
    let id = task.id?;
    let status = match task.status.as_deref() {
        Some("completed") => TaskStatus::Completed,
        _ => TaskStatus::NeedsAction,
    };
    Some(RawTask {
        id,
        title: task.title.unwrap_or_default(),
        due: task.due,
        status,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskListResponse {
    #[serde(default)]
    items: Vec<ApiTask>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTask {
    id: Option<String>,
    title: Option<String>,
    due: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsertBody<'a> {
    title: &'a str,
    due: &'a str,
    status: &'a str,
}

/// PATCH body; reopening a task also clears its completion timestamp.
#[derive(Debug, Serialize)]
struct StatusPatch {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<()>,
}

impl StatusPatch {
    fn new(status: TaskStatus) -> Self {
        Self {
            status: status.as_str(),
            completed: match status {
                TaskStatus::NeedsAction => Some(()),
                TaskStatus::Completed => None,
            },
        }
    }
}
