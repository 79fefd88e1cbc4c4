//! Login, OAuth callback and logout.

use axum::Router;
use axum::extract::{RawQuery, State};
use axum::response::Redirect;
use axum::routing::get;
use tracing::{info, warn};

use crate::config::CALLBACK_PATH;
use crate::error::ServerResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route(CALLBACK_PATH, get(oauth_callback))
        .route("/logout", get(logout))
}

/// GET /login - Redirect to Google's consent page
async fn login(State(state): State<AppState>) -> Redirect {
    let (url, pending) = state.flow.begin_authorization(state.redirect_uri());
    state.set_pending(pending);
    Redirect::to(&url)
}

/// GET /oauth2callback - Finish the authorization and store the credential
async fn oauth_callback(State(state): State<AppState>, RawQuery(query): RawQuery) -> Redirect {
    let Some(pending) = state.take_pending() else {
        warn!("OAuth callback without an authorization in progress");
        return Redirect::to("/?auth_error=no_pending_login");
    };

    let callback_url = format!(
        "{}?{}",
        state.redirect_uri(),
        query.unwrap_or_default()
    );

    match state.flow.complete_authorization(&callback_url, pending).await {
        Ok(credential) => match state.credentials.set(credential) {
            Ok(()) => {
                info!("login completed");
                Redirect::to("/")
            }
            Err(e) => {
                warn!(error = %e, "failed to store credential");
                Redirect::to("/?auth_error=credential_store")
            }
        },
        Err(e) => {
            warn!(error = %e, "authorization failed");
            Redirect::to(&format!("/?auth_error={}", e.code().as_str()))
        }
    }
}

/// GET /logout - Forget the credential
async fn logout(State(state): State<AppState>) -> ServerResult<Redirect> {
    state.credentials.clear()?;
    info!("logged out");
    Ok(Redirect::to("/"))
}
