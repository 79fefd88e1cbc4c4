//! Error types for credential handling and remote API calls.
//!
//! Every failure carries a fine-grained [`ProviderErrorCode`] and maps onto a
//! coarse [`ErrorClass`] that callers use to decide what to show: a login
//! prompt, a failed-refresh notice, or a rejected form.

use std::fmt;
use thiserror::Error;

/// Coarse classification of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// No credential, or the remote service rejected it. Show a login prompt.
    Auth,
    /// Transport failure or non-2xx response. The cycle fails, the next one may succeed.
    Remote,
    /// Input rejected before any remote call.
    Validation,
    /// Missing or invalid local configuration.
    Config,
    /// Unexpected local state.
    Internal,
}

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// No credential, or the credential is invalid/expired.
    AuthenticationFailed,
    /// The credential lacks permission for the resource.
    AuthorizationFailed,
    /// Connection failed, DNS resolution, etc.
    NetworkError,
    /// The remote call did not complete within the per-call timeout.
    Timeout,
    /// Too many requests.
    RateLimited,
    /// Server returned an error (5xx or unexpected status).
    ServerError,
    /// Response body could not be parsed.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// Input rejected locally.
    ValidationFailed,
    /// Missing or invalid config.
    ConfigurationError,
    /// Unexpected state, bug.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns the coarse class of this code.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::AuthenticationFailed | Self::AuthorizationFailed => ErrorClass::Auth,
            Self::NetworkError
            | Self::Timeout
            | Self::RateLimited
            | Self::ServerError
            | Self::InvalidResponse
            | Self::NotFound => ErrorClass::Remote,
            Self::ValidationFailed => ErrorClass::Validation,
            Self::ConfigurationError => ErrorClass::Config,
            Self::InternalError => ErrorClass::Internal,
        }
    }

    /// Returns a machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to Google or handling credentials.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The remote API that produced the error (e.g. "calendar", "tasks", "oauth").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Timeout, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ValidationFailed, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the remote API name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the coarse error class.
    pub fn class(&self) -> ErrorClass {
        self.code.class()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the remote API name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if the user has to log in (again).
    pub fn is_auth(&self) -> bool {
        self.class() == ErrorClass::Auth
    }

    /// Returns true for transport failures and non-2xx responses.
    pub fn is_remote(&self) -> bool {
        self.class() == ErrorClass::Remote
    }

    /// Returns true if the input was rejected locally.
    pub fn is_validation(&self) -> bool {
        self.class() == ErrorClass::Validation
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
