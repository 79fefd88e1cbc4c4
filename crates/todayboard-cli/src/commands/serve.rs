//! Web dashboard command.

use std::net::SocketAddr;
use std::sync::Arc;

use todayboard_providers::CredentialStore;
use todayboard_providers::google::AuthorizationFlow;
use todayboard_server::{AppState, ServerConfig};

use super::google_sync;
use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Serve the dashboard until Ctrl-C.
///
/// The web session logs in through the browser on its own and keeps the
/// credential in memory; it never reads or writes the CLI's token file.
pub async fn serve(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
    bind: Option<SocketAddr>,
    public_url: Option<String>,
) -> ClientResult<()> {
    let server_config = server_config(config, bind, public_url);
    let google = config
        .google
        .to_provider_config(overrides)
        .map_err(ClientError::Config)?;

    let state = AppState::new(
        google_sync(config, overrides)?,
        AuthorizationFlow::new(google)?,
        Arc::new(CredentialStore::in_memory()),
        server_config.redirect_uri(),
    );

    println!("Dashboard: http://{}", server_config.bind);
    println!("OAuth redirect URI: {}", server_config.redirect_uri());
    todayboard_server::serve(server_config, state).await?;
    Ok(())
}

fn server_config(
    config: &ClientConfig,
    bind: Option<SocketAddr>,
    public_url: Option<String>,
) -> ServerConfig {
    let mut server_config = config.server_config();
    if let Some(bind) = bind {
        server_config.bind = bind;
    }
    if let Some(url) = public_url {
        server_config = server_config.with_public_url(url);
    }
    server_config
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = ClientConfig::default();
        config.refresh.interval_secs = 60;

        let bound = server_config(&config, Some("0.0.0.0:9000".parse().unwrap()), None);
        assert_eq!(bound.bind.port(), 9000);
        assert_eq!(bound.refresh_interval, Duration::from_secs(60));
        assert_eq!(bound.redirect_uri(), "http://0.0.0.0:9000/oauth2callback");

        let proxied = server_config(&config, None, Some("https://board.example.com".to_string()));
        assert_eq!(proxied.bind.port(), 8050);
        assert_eq!(proxied.redirect_uri(), "https://board.example.com/oauth2callback");
    }

    #[tokio::test]
    async fn requires_oauth_client() {
        let err = serve(&ClientConfig::default(), &CredentialOverrides::default(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
