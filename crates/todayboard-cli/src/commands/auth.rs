//! Authentication commands.

use std::path::PathBuf;

use serde::Serialize;
use todayboard_core::OutputFormat;
use todayboard_providers::CredentialStore;
use todayboard_providers::google::AuthorizationFlow;
use tracing::info;

use super::{LOGIN_HINT, open_store};
use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Run the browser authorization flow and persist the credential.
pub async fn login(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
    force: bool,
) -> ClientResult<()> {
    let google = config
        .google
        .to_provider_config(overrides)
        .map_err(ClientError::Config)?;
    let store = open_store(config)?;

    if store.is_present() && !force {
        println!("Already authenticated with Google.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    println!("Starting Google authentication...");
    println!();
    println!("A browser window will open for you to authorize access to");
    println!("your calendar and tasks. If it doesn't, copy the URL printed below.");
    println!();

    let flow = AuthorizationFlow::new(google)?;
    let credential = flow.authorize_loopback().await?;
    store.set(credential)?;

    info!(path = ?store.path(), "Google authentication successful");
    println!("Authentication successful!");
    println!("Credential saved to {}", config.google.token_path().display());
    Ok(())
}

/// Forget the stored credential.
pub fn logout(config: &ClientConfig) -> ClientResult<()> {
    let store = config.credential_store();
    store.clear()?;
    println!("Logged out.");
    Ok(())
}

/// Whether a credential is stored, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub token_path: Option<PathBuf>,
}

impl AuthStatus {
    pub fn of(store: &CredentialStore) -> Self {
        Self {
            authenticated: store.is_present(),
            token_path: store.path().map(PathBuf::from),
        }
    }

    fn render(&self, format: OutputFormat) -> ClientResult<String> {
        if format == OutputFormat::Json {
            return Ok(serde_json::to_string(self)?);
        }

        let location = self
            .token_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "memory".to_string());
        Ok(if self.authenticated {
            format!("Authenticated (credential: {})", location)
        } else {
            format!("Not authenticated. {}", LOGIN_HINT)
        })
    }
}

/// Report whether a credential is stored.
pub fn status(config: &ClientConfig, format: OutputFormat) -> ClientResult<()> {
    let store = open_store(config)?;
    println!("{}", AuthStatus::of(&store).render(format)?);
    Ok(())
}
