//! Client error types.

use thiserror::Error;
use todayboard_providers::ProviderError;
use todayboard_server::ServerError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether running `todayboard auth login` would fix this.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_auth())
    }
}
