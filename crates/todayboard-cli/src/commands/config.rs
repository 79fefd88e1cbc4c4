//! Configuration commands.

use std::path::Path;

use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, including the OAuth client when one is set.
pub fn validate(config: &ClientConfig, overrides: &CredentialOverrides) -> ClientResult<()> {
    check(config, overrides)?;
    println!("Configuration is valid.");
    Ok(())
}

fn check(config: &ClientConfig, overrides: &CredentialOverrides) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    let google = &config.google;
    let has_client = google.client_id.is_some()
        || google.client_secret.is_some()
        || google.credentials_file.is_some()
        || overrides.client_id.is_some()
        || overrides.credentials_file.is_some();
    if has_client {
        google
            .to_provider_config(overrides)
            .map_err(|e| ClientError::Config(format!("invalid Google settings: {}", e)))?;
    }
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_without_client() {
        assert!(check(&ClientConfig::default(), &CredentialOverrides::default()).is_ok());
    }

    #[test]
    fn partial_client_is_invalid() {
        let mut config = ClientConfig::default();
        config.google.client_id = Some("abc.apps.googleusercontent.com".to_string());

        let err = check(&config, &CredentialOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("client_secret"));
    }

    #[test]
    fn complete_client_is_valid() {
        let mut config = ClientConfig::default();
        config.google.client_id = Some("abc.apps.googleusercontent.com".to_string());
        config.google.client_secret = Some("secret".to_string());

        assert!(check(&config, &CredentialOverrides::default()).is_ok());
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut config = ClientConfig::default();
        config.google.request_timeout_secs = 0;

        let err = check(&config, &CredentialOverrides::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
