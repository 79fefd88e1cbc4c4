//! Shared application state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use todayboard_providers::google::{AuthorizationFlow, PendingAuthorization};
use todayboard_providers::{CredentialStore, TodaySync};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// State behind every route.
///
/// The server serves a single session: one credential store and at most one
/// authorization in flight.
#[derive(Clone)]
pub struct AppState {
    pub sync: TodaySync,
    pub flow: AuthorizationFlow,
    pub credentials: Arc<CredentialStore>,
    pending: Arc<Mutex<Option<PendingAuthorization>>>,
    redirect_uri: String,
    refresh_interval: Duration,
    clock: Clock,
}

impl AppState {
    pub fn new(
        sync: TodaySync,
        flow: AuthorizationFlow,
        credentials: Arc<CredentialStore>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            sync,
            flow,
            credentials,
            pending: Arc::new(Mutex::new(None)),
            redirect_uri: redirect_uri.into(),
            refresh_interval: Duration::from_secs(300),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Remembers the authorization started by `/login`, replacing any older one.
    pub fn set_pending(&self, pending: PendingAuthorization) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(pending);
    }

    /// Takes the authorization in flight, if any.
    pub fn take_pending(&self) -> Option<PendingAuthorization> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
