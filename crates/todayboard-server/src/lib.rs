//! Web dashboard and refresh scheduler.
//!
//! - [`routes::router`] - login/callback/logout, dashboard JSON, task endpoints, HTML page
//! - [`Scheduler`] - periodic refresh trigger with a command channel
//! - [`serve`] - binds the listener and runs the dashboard until Ctrl-C
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use todayboard_providers::google::{AuthorizationFlow, GoogleConfig, OAuthCredentials};
//! use todayboard_providers::{CredentialStore, TodaySync};
//! use todayboard_server::{AppState, ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let google = GoogleConfig::new(OAuthCredentials::from_file("client_secret.json")?);
//!     let config = ServerConfig::default();
//!     let state = AppState::new(
//!         TodaySync::google(&google)?,
//!         AuthorizationFlow::new(google)?,
//!         Arc::new(CredentialStore::in_memory()),
//!         config.redirect_uri(),
//!     );
//!     serve(config, state).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
pub mod routes;
mod scheduler;
mod state;

pub use config::{CALLBACK_PATH, ServerConfig};
pub use error::{ErrorResponse, ServerError, ServerResult};
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState,
};
pub use state::{AppState, Clock};

use tracing::info;

/// Serves the dashboard on `config.bind` until Ctrl-C.
pub async fn serve(config: ServerConfig, state: AppState) -> ServerResult<()> {
    let state = state.with_refresh_interval(config.refresh_interval);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %config.bind,
        redirect_uri = %config.redirect_uri(),
        "dashboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
