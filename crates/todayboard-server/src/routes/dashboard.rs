//! Dashboard snapshot endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use todayboard_core::DashboardSnapshot;

use crate::error::ServerResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard))
}

/// GET /api/dashboard - Today's events and tasks, fetched fresh
async fn dashboard(State(state): State<AppState>) -> ServerResult<Json<DashboardSnapshot>> {
    let snapshot = state
        .sync
        .refresh_from(&state.credentials, state.now())
        .await?;
    Ok(Json(snapshot))
}
