//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod serve;
pub mod show;
pub mod tasks;
pub mod watch;

use todayboard_providers::{CredentialStore, TodaySync};

use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Hint printed whenever a command needs a stored credential.
pub const LOGIN_HINT: &str = "Run `todayboard auth login` to sign in.";

/// Opens the persistent credential store and loads any saved credential.
pub fn open_store(config: &ClientConfig) -> ClientResult<CredentialStore> {
    let store = config.credential_store();
    store.load()?;
    Ok(store)
}

/// Builds the Google-backed sync service.
pub fn google_sync(config: &ClientConfig, overrides: &CredentialOverrides) -> ClientResult<TodaySync> {
    let google = config
        .google
        .to_provider_config(overrides)
        .map_err(ClientError::Config)?;
    Ok(TodaySync::google(&google)?)
}
