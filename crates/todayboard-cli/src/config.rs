//! Client configuration.
//!
//! Everything lives in one `config.toml`, by default at
//! `~/.config/todayboard/config.toml`:
//!
//! ```toml
//! [google]
//! client_id = "env::GOOGLE_CLIENT_ID"
//! client_secret = "pass::google/todayboard"
//! calendar_id = "primary"
//! task_list_id = "@default"
//!
//! [refresh]
//! interval_secs = 300
//!
//! [server]
//! bind = "127.0.0.1:8050"
//! ```
//!
//! `client_id`/`client_secret` accept the references described in
//! [`crate::secret`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use todayboard_providers::CredentialStore;
use todayboard_providers::google::{GoogleConfig, OAuthCredentials};
use todayboard_server::ServerConfig;

/// Configuration for the todayboard client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google account and API settings.
    pub google: GoogleSettings,

    /// Terminal watch refresh settings.
    pub refresh: RefreshSettings,

    /// Web dashboard settings.
    pub server: ServerSettings,
}

/// `[google]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Client secrets JSON downloaded from the Cloud Console.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    pub calendar_id: String,

    pub task_list_id: String,

    /// Where the CLI keeps its OAuth credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    pub request_timeout_secs: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            credentials_file: None,
            calendar_id: GoogleConfig::DEFAULT_CALENDAR_ID.to_string(),
            task_list_id: GoogleConfig::DEFAULT_TASK_LIST_ID.to_string(),
            token_path: None,
            request_timeout_secs: GoogleConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[refresh]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: SocketAddr,

    /// Base URL Google redirects back to, when it differs from `bind`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: ServerConfig::default().bind,
            public_url: None,
        }
    }
}

/// OAuth client credentials given on the command line or environment.
///
/// These take precedence over `[google]`.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub credentials_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todayboard")
            .join("config.toml")
    }

    /// Loads the default file, or the defaults if it does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse {}: {}", path.display(), e))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Builds the web dashboard configuration.
    pub fn server_config(&self) -> ServerConfig {
        let mut config =
            ServerConfig::new(self.server.bind).with_refresh_interval(self.refresh_interval());
        if let Some(ref url) = self.server.public_url {
            config = config.with_public_url(url);
        }
        config
    }

    /// Returns the credential store the CLI persists its login to.
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::persistent(self.google.token_path())
    }

    /// Checks the values that do not need OAuth client credentials.
    pub fn validate(&self) -> Result<(), String> {
        if self.google.calendar_id.trim().is_empty() {
            return Err("google.calendar_id must not be empty".to_string());
        }
        if self.google.task_list_id.trim().is_empty() {
            return Err("google.task_list_id must not be empty".to_string());
        }
        if self.google.request_timeout_secs == 0 {
            return Err("google.request_timeout_secs must be greater than zero".to_string());
        }
        if self.refresh.interval_secs == 0 {
            return Err("refresh.interval_secs must be greater than zero".to_string());
        }
        if let Some(ref url) = self.server.public_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!("server.public_url must be an http(s) URL, got {:?}", url));
        }
        Ok(())
    }
}

impl GoogleSettings {
    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(CredentialStore::default_path)
    }

    /// Builds the provider configuration from these settings.
    pub fn to_provider_config(
        &self,
        overrides: &CredentialOverrides,
    ) -> Result<GoogleConfig, String> {
        let credentials = self.resolve_credentials(overrides)?;

        let config = GoogleConfig::new(credentials)
            .with_calendar_id(&self.calendar_id)
            .with_task_list_id(&self.task_list_id)
            .with_timeout(Duration::from_secs(self.request_timeout_secs));
        config.validate()?;
        Ok(config)
    }

    /// Resolves OAuth client credentials.
    ///
    /// Order: `--client-id`/`--client-secret`, `--credentials-file`, inline
    /// `[google]` values, then `[google].credentials_file`.
    pub fn resolve_credentials(
        &self,
        overrides: &CredentialOverrides,
    ) -> Result<OAuthCredentials, String> {
        if let (Some(id), Some(secret)) = (&overrides.client_id, &overrides.client_secret) {
            return Ok(OAuthCredentials::new(id, secret));
        }
        if let Some(ref path) = overrides.credentials_file {
            return OAuthCredentials::from_file(path).map_err(|e| e.to_string());
        }

        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => {
                let id = crate::secret::resolve(id)
                    .map_err(|e| format!("failed to resolve client_id: {}", e))?;
                let secret = crate::secret::resolve(secret)
                    .map_err(|e| format!("failed to resolve client_secret: {}", e))?;
                Ok(OAuthCredentials::new(id, secret))
            }
            (Some(_), None) => {
                Err("client_secret is missing from the [google] section".to_string())
            }
            (None, Some(_)) => Err("client_id is missing from the [google] section".to_string()),
            (None, None) => match self.credentials_file {
                Some(ref path) => OAuthCredentials::from_file(path).map_err(|e| e.to_string()),
                None => Err(format!(
                    "Google OAuth client not configured. Add to {}:\n  \
                     [google]\n  \
                     client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                     client_secret = \"YOUR_SECRET\"\n\n  \
                     or pass --credentials-file <client_secret.json>",
                    ClientConfig::default_path().display()
                )),
            },
        }
    }
}
