//! Task creation and completion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use todayboard_core::TaskStatus;

use crate::error::ServerResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{task_id}/complete", post(complete_task))
}

/// Request body for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
}

/// A task id and its resulting status
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub status: TaskStatus,
}

/// POST /api/tasks - Create a task due today
async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ServerResult<(StatusCode, Json<TaskResponse>)> {
    let credential = state.credentials.require()?;
    let id = state
        .sync
        .create_task(&credential, &req.title, state.now())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            id,
            status: TaskStatus::NeedsAction,
        }),
    ))
}

/// POST /api/tasks/{task_id}/complete - Mark a task completed
async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ServerResult<Json<TaskResponse>> {
    let credential = state.credentials.require()?;
    state.sync.complete_task(&credential, &task_id).await?;

    Ok(Json(TaskResponse {
        id: task_id,
        status: TaskStatus::Completed,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use todayboard_core::{RawTask, TaskStatus};

    use crate::routes::testing::{FakeCalendar, Harness, body_json, get};

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_task_due_today() {
        let harness = Harness::new(FakeCalendar::default(), vec![]).logged_in();

        let response = harness
            .send(post_json("/api/tasks", r#"{"title": "Buy milk"}"#))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], "new-1");
        assert_eq!(body["status"], "needsAction");

        let stored = harness.tasks.tasks.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].due.as_deref(), Some("2024-03-15T00:00:00.000Z"));
    }

    #[tokio::test]
    async fn empty_title_is_bad_request() {
        let harness = Harness::new(FakeCalendar::default(), vec![]).logged_in();

        let response = harness.send(post_json("/api/tasks", r#"{"title": "  "}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "validation_failed");
        assert_eq!(harness.remote_calls(), 0);
    }

    #[tokio::test]
    async fn create_requires_login() {
        let harness = Harness::new(FakeCalendar::default(), vec![]);

        let response = harness
            .send(post_json("/api/tasks", r#"{"title": "Buy milk"}"#))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(harness.remote_calls(), 0);
    }

    #[tokio::test]
    async fn complete_task_twice() {
        let tasks = vec![RawTask::new("t1", "Buy milk").with_due("2024-03-15T00:00:00.000Z")];
        let harness = Harness::new(FakeCalendar::default(), tasks).logged_in();

        for _ in 0..2 {
            let response = harness.send(post("/api/tasks/t1/complete")).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["id"], "t1");
            assert_eq!(body["status"], "completed");
        }

        assert_eq!(
            harness.tasks.tasks.lock().unwrap()[0].status,
            TaskStatus::Completed
        );
        let dashboard = body_json(harness.send(get("/api/dashboard")).await).await;
        assert!(dashboard["tasks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_unknown_task_is_bad_gateway() {
        let harness = Harness::new(FakeCalendar::default(), vec![]).logged_in();

        let response = harness.send(post("/api/tasks/missing/complete")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["code"], "not_found");
    }
}
