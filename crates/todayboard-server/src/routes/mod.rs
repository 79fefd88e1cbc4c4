//! HTTP routes.

mod auth;
mod dashboard;
mod page;
mod tasks;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(page::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(tasks::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
