//! Server error types and their HTTP mapping.

use std::io;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use todayboard_providers::{ErrorClass, ProviderError};
use tracing::error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failure reported by the credential store, the OAuth flow or a remote API.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// IO error (bind, accept, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    /// Returns the HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Provider(e) => match e.class() {
                ErrorClass::Auth => StatusCode::UNAUTHORIZED,
                ErrorClass::Validation => StatusCode::BAD_REQUEST,
                ErrorClass::Remote => StatusCode::BAD_GATEWAY,
                ErrorClass::Config | ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Provider(e) => e.code().as_str(),
            Self::Io(_) => "io_error",
        }
    }
}

/// JSON body of every API error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        });
        (status, body).into_response()
    }
}
