//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Path Google redirects to after consent.
pub const CALLBACK_PATH: &str = "/oauth2callback";

/// Web dashboard configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,
    /// Externally visible base URL, when the server sits behind a proxy.
    /// Defaults to `http://{bind}`.
    pub public_url: Option<String>,
    /// How often the page reloads the dashboard.
    pub refresh_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8050)),
            public_url: None,
            refresh_interval: Duration::from_secs(300),
        }
    }
}

impl ServerConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            ..Default::default()
        }
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Returns the OAuth redirect URI registered for this server.
    pub fn redirect_uri(&self) -> String {
        let base = match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind),
        };
        format!("{}{}", base, CALLBACK_PATH)
    }
}
