//! Google API configuration: OAuth client credentials, scopes, endpoints.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials registered in the Google Cloud Console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Structure of Google's client secrets JSON file.
///
/// Accepts the Cloud Console format (`installed` or `web` section) and the
/// flat format with `client_id`/`client_secret` at the root.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads credentials from a client secrets JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from a client secrets JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(ProviderError::configuration(
            "credentials file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level",
        ))
    }

    /// Checks that the credentials look like a Google OAuth client.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Settings shared by the OAuth flow and the Calendar/Tasks clients.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub credentials: OAuthCredentials,
    /// Calendar queried for today's events.
    pub calendar_id: String,
    /// Task list queried and written.
    pub task_list_id: String,
    /// Scopes requested at authorization time.
    pub scopes: Vec<String>,
    /// HTTP request timeout, also used as the per-call sync timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Port range tried by the loopback authorization server.
    pub loopback_port_range: (u16, u16),
    pub auth_url: String,
    pub token_url: String,
    pub calendar_base_url: String,
    pub tasks_base_url: String,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_CALENDAR_ID: &'static str = "primary";
    pub const DEFAULT_TASK_LIST_ID: &'static str = "@default";

    pub const CALENDAR_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.readonly";
    /// Read-write, since tasks are inserted and completed.
    pub const TASKS_SCOPE: &'static str = "https://www.googleapis.com/auth/tasks";

    pub const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    pub const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";
    pub const CALENDAR_BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";
    pub const TASKS_BASE_URL: &'static str = "https://tasks.googleapis.com/tasks/v1";

    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            calendar_id: Self::DEFAULT_CALENDAR_ID.to_string(),
            task_list_id: Self::DEFAULT_TASK_LIST_ID.to_string(),
            scopes: vec![Self::CALENDAR_SCOPE.to_string(), Self::TASKS_SCOPE.to_string()],
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("todayboard/{}", env!("CARGO_PKG_VERSION")),
            loopback_port_range: (8080, 8090),
            auth_url: Self::AUTH_URL.to_string(),
            token_url: Self::TOKEN_URL.to_string(),
            calendar_base_url: Self::CALENDAR_BASE_URL.to_string(),
            tasks_base_url: Self::TASKS_BASE_URL.to_string(),
        }
    }

    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    pub fn with_task_list_id(mut self, id: impl Into<String>) -> Self {
        self.task_list_id = id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Builds the HTTP client used for every Google request.
    pub fn http_client(&self) -> ProviderResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }
        if self.calendar_id.trim().is_empty() {
            return Err("calendar_id must not be empty".to_string());
        }
        if self.task_list_id.trim().is_empty() {
            return Err("task_list_id must not be empty".to_string());
        }
        if self.timeout.is_zero() {
            return Err("request timeout must be greater than zero".to_string());
        }
        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err("invalid loopback port range".to_string());
        }
        Ok(())
    }
}
