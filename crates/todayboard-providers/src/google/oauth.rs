//! OAuth 2.0 authorization-code flow with PKCE for Google APIs.
//!
//! The flow is split in two halves so it can be driven by a web server as
//! well as by a terminal:
//!
//! 1. [`AuthorizationFlow::begin_authorization`] builds the consent URL and
//!    returns the opaque [`PendingAuthorization`] the caller keeps until the
//!    redirect comes back.
//! 2. [`AuthorizationFlow::complete_authorization`] takes the full callback
//!    URL, checks the state and exchanges the code for a [`Credential`].
//!
//! [`AuthorizationFlow::authorize_loopback`] chains both halves around a
//! short-lived local HTTP listener for the CLI.

use std::ops::RangeInclusive;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use url::Url;

use crate::credential::Credential;
use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleConfig;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long the loopback listener waits for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// How long one accepted connection may take to send its request line.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

const PROVIDER: &str = "oauth";

/// State kept between the two halves of the flow.
///
/// Opaque to callers: hold it (server-side) and hand it back unchanged.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    state: String,
    verifier: String,
    redirect_uri: String,
}

impl PendingAuthorization {
    /// The anti-forgery state value embedded in the consent URL.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

/// Code and state extracted from an authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Drives the Google authorization-code flow.
#[derive(Debug, Clone)]
pub struct AuthorizationFlow {
    config: GoogleConfig,
    http_client: reqwest::Client,
}

impl AuthorizationFlow {
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        let http_client = config.http_client()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Starts an authorization and returns the consent URL to redirect the
    /// user to, along with the state to keep for the callback.
    pub fn begin_authorization(&self, redirect_uri: &str) -> (String, PendingAuthorization) {
        let pkce = PkceFlow::new();
        let url = pkce.build_auth_url(
            &self.config.auth_url,
            &self.config.credentials.client_id,
            redirect_uri,
            &self.config.scopes,
        );
        debug!("authorization URL: {}", url);

        let pending = PendingAuthorization {
            state: pkce.state,
            verifier: pkce.verifier,
            redirect_uri: redirect_uri.to_string(),
        };
        (url, pending)
    }

    /// Finishes an authorization from the URL Google redirected to.
    pub async fn complete_authorization(
        &self,
        callback_url: &str,
        pending: PendingAuthorization,
    ) -> ProviderResult<Credential> {
        let params = parse_callback(callback_url)?;

        if params.state != pending.state {
            return Err(
                ProviderError::authentication("OAuth state mismatch").with_provider(PROVIDER)
            );
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&params.code, &pending.verifier, &pending.redirect_uri)
            .await
    }

    /// Runs the whole flow through a loopback redirect, opening the user's
    /// browser on the consent page.
    pub async fn authorize_loopback(&self) -> ProviderResult<Credential> {
        let (start, end) = self.config.loopback_port_range;
        let (listener, port) = bind_loopback(start..=end).await?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);

        let (auth_url, pending) = self.begin_authorization(&redirect_uri);

        info!("starting OAuth flow, opening browser");
        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nPlease open this URL in your browser:\n\n{}\n", auth_url);
        }

        let callback = wait_for_callback(&listener, port, REQUEST_READ_TIMEOUT);
        let callback_url = tokio::time::timeout(CALLBACK_TIMEOUT, callback)
            .await
            .map_err(|_| {
                ProviderError::authentication("OAuth callback timeout").with_provider(PROVIDER)
            })??;

        self.complete_authorization(&callback_url, pending).await
    }

    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> ProviderResult<Credential> {
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("token exchange request failed: {}", e))
                    .with_provider(PROVIDER)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_provider(PROVIDER)
        })?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token exchange failed ({}): {}",
                status, body
            ))
            .with_provider(PROVIDER));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
                .with_provider(PROVIDER)
        })?;

        info!("successfully obtained tokens");
        Ok(token.into_credential(&self.config))
    }
}

/// Extracts the authorization code and state from a redirect URL.
///
/// Accepts an absolute URL or a bare `/path?query` request target.
pub fn parse_callback(callback_url: &str) -> ProviderResult<CallbackParams> {
    let url = Url::parse(callback_url)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(callback_url)))
        .map_err(|e| {
            ProviderError::validation(format!("invalid callback URL: {}", e)).with_provider(PROVIDER)
        })?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(
            ProviderError::authentication(format!("authorization denied: {}", error))
                .with_provider(PROVIDER),
        );
    }

    match code {
        Some(code) if !code.is_empty() => Ok(CallbackParams {
            code,
            state: state.unwrap_or_default(),
        }),
        _ => Err(
            ProviderError::authentication("missing authorization code in callback")
                .with_provider(PROVIDER),
        ),
    }
}

/// Binds the first free loopback port in `ports`.
async fn bind_loopback(ports: RangeInclusive<u16>) -> ProviderResult<(TcpListener, u16)> {
    let (start, end) = (*ports.start(), *ports.end());
    for port in ports {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)).await {
            debug!("bound loopback server on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no available port in range {}-{}",
        start, end
    )))
}

/// Accepts connections until one hits `/callback`, answers the browser and
/// returns the full callback URL.
///
/// Browsers open speculative connections that never send a request; those
/// are dropped after `read_timeout`.
async fn wait_for_callback(
    listener: &TcpListener,
    port: u16,
    read_timeout: Duration,
) -> ProviderResult<String> {
    loop {
        let (stream, _) = listener.accept().await.map_err(|e| {
            ProviderError::internal(format!("failed to accept connection: {}", e))
        })?;

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut request_line = String::new();
        match tokio::time::timeout(read_timeout, reader.read_line(&mut request_line)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                debug!("failed to read loopback request: {}", e);
                continue;
            }
            Err(_) => {
                debug!("dropping idle loopback connection");
                continue;
            }
        }

        // GET /callback?code=...&state=... HTTP/1.1
        let mut parts = request_line.split_whitespace();
        let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
            continue;
        };
        if !target.starts_with("/callback") {
            let _ = write_half
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n")
                .await;
            continue;
        }

        let callback_url = format!("http://127.0.0.1:{}{}", port, target);
        let body = match parse_callback(&callback_url) {
            Ok(_) => {
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
                <html><body><h1>Authorization Successful</h1>\
                <p>You can close this window and return to the terminal.</p></body></html>"
            }
            Err(_) => {
                "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
                <html><body><h1>Authorization Failed</h1>\
                <p>You can close this window.</p></body></html>"
            }
        };
        let _ = write_half.write_all(body.as_bytes()).await;
        let _ = write_half.flush().await;

        return Ok(callback_url);
    }
}

/// PKCE verifier, challenge and state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    /// SHA-256 of the verifier, base64url encoded.
    pub challenge: String,
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    /// Builds the consent URL.
    pub fn build_auth_url(
        &self,
        auth_url: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&include_granted_scopes=true&prompt=consent",
            auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from Google's token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_credential(self, config: &GoogleConfig) -> Credential {
        let scopes: Vec<String> = match self.scope.as_deref() {
            Some(granted) if !granted.trim().is_empty() => {
                granted.split_whitespace().map(String::from).collect()
            }
            _ => config.scopes.clone(),
        };

        let mut credential = Credential::new(self.access_token, &config.token_url)
            .with_client(
                &config.credentials.client_id,
                &config.credentials.client_secret,
            )
            .with_scopes(scopes);
        credential.refresh_token = self.refresh_token;
        credential.id_token = self.id_token;
        credential
    }
}
