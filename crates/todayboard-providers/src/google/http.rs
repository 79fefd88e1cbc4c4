//! Response handling shared by the Calendar and Tasks clients.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// 403 reasons that mean "slow down" rather than "log in again".
const QUOTA_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
    "quotaExceeded",
    "RATE_LIMIT_EXCEEDED",
];

/// 403 reasons a fresh login with the right scopes fixes.
const SCOPE_REASONS: &[&str] = &[
    "insufficientPermissions",
    "authError",
    "ACCESS_TOKEN_SCOPE_INSUFFICIENT",
];

/// Maps a transport failure to a provider error.
pub(crate) fn send_error(e: reqwest::Error, api: &str) -> ProviderError {
    let err = if e.is_timeout() {
        ProviderError::timeout("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    };
    err.with_provider(api).with_source(e)
}

/// Passes 2xx responses through and maps everything else to an error.
pub(crate) async fn check_status(response: Response, api: &str) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!(api, %status, body = body.trim(), "request rejected");

    Err(status_error(status, &path, retry_after, body.trim(), api).with_provider(api))
}

fn status_error(
    status: StatusCode,
    path: &str,
    retry_after: Option<u64>,
    body: &str,
    api: &str,
) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED => {
            ProviderError::authentication("access token expired or invalid")
        }
        StatusCode::FORBIDDEN => forbidden_error(body, api),
        StatusCode::NOT_FOUND => ProviderError::not_found(format!("resource not found: {}", path)),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )),
        _ => ProviderError::server(format!("API error ({}): {}", status, body)),
    }
}

/// Google answers 403 both for missing scopes and for exhausted quota.
fn forbidden_error(body: &str, api: &str) -> ProviderError {
    let reasons = error_reasons(body);
    let has = |known: &[&str]| reasons.iter().any(|r| known.contains(&r.as_str()));

    if has(QUOTA_REASONS) {
        ProviderError::rate_limited(format!("quota exceeded (403): {}", body))
    } else if reasons.is_empty() || has(SCOPE_REASONS) {
        ProviderError::authorization(format!("access denied to {}: {}", api, body))
    } else {
        ProviderError::server(format!("request refused (403): {}", body))
    }
}

/// Google API error envelope; only the reasons are of interest.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    errors: Vec<ErrorReason>,
    #[serde(default)]
    details: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    reason: Option<String>,
}

fn error_reasons(body: &str) -> Vec<String> {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return Vec::new();
    };
    envelope
        .error
        .errors
        .into_iter()
        .chain(envelope.error.details)
        .filter_map(|e| e.reason)
        .collect()
}

/// Reads and parses a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, api: &str) -> ProviderResult<T> {
    let body = response.text().await.map_err(|e| {
        ProviderError::network(format!("failed to read response: {}", e)).with_provider(api)
    })?;
    parse_json(&body, api)
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, api: &str) -> ProviderResult<T> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e))
            .with_provider(api)
    })
}
