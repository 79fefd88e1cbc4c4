//! OAuth2 credential and the session credential store.
//!
//! A [`Credential`] is created when the authorization flow completes, read
//! before every remote call and dropped at logout. The [`CredentialStore`]
//! is owned by whoever drives a session (the CLI process, the web server
//! state) and passed explicitly to the sync layer.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// The OAuth2 token bundle used to call the remote APIs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token sent with every API request.
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    /// Token endpoint the credential was issued by.
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    /// Scopes granted by the user.
    pub scopes: BTreeSet<String>,
}

impl Credential {
    /// Creates a credential with the mandatory fields set.
    pub fn new(access_token: impl Into<String>, token_endpoint: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            id_token: None,
            token_endpoint: token_endpoint.into(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: BTreeSet::new(),
        }
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn with_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the minimum required before an API call is attempted.
    ///
    /// Expiry is not checked here; an expired token is reported by the
    /// remote service as an authentication error.
    pub fn ensure_usable(&self) -> ProviderResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(ProviderError::authentication("credential has no access token"));
        }
        if self.token_endpoint.trim().is_empty() {
            return Err(ProviderError::authentication("credential has no token endpoint"));
        }
        Ok(())
    }

    /// Returns true if every scope in `required` was granted.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Holds the credential of the active session.
///
/// A store is either purely in memory (the web dashboard, where the
/// credential lives as long as the server session) or backed by a JSON file
/// (the CLI, where it must survive between invocations).
#[derive(Debug, Default)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    credential: RwLock<Option<Credential>>,
}

impl CredentialStore {
    /// Creates an empty store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates an empty store persisted at `path`. Call [`load`](Self::load)
    /// to pick up a previously saved credential.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            credential: RwLock::new(None),
        }
    }

    /// Returns the default credential file path.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todayboard")
            .join("google-credential.json")
    }

    /// Replaces the in-memory credential with the one on disk.
    ///
    /// Returns Ok(true) if a credential was loaded, Ok(false) if none exists
    /// or the store is in-memory. A missing file drops any credential held,
    /// so a logout from another process is picked up.
    pub fn load(&self) -> ProviderResult<bool> {
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };
        if !path.exists() {
            debug!("no credential file at {:?}", path);
            *self.write_guard() = None;
            return Ok(false);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!("failed to read credential file: {}", e))
        })?;
        let credential: Credential = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credential file: {}", e))
        })?;

        info!("loaded credential from {:?}", path);
        *self.write_guard() = Some(credential);
        Ok(true)
    }

    /// Stores the credential, replacing any previous one.
    pub fn set(&self, credential: Credential) -> ProviderResult<()> {
        if let Some(path) = self.path.as_deref() {
            save(path, &credential)?;
        }
        *self.write_guard() = Some(credential);
        Ok(())
    }

    /// Returns a clone of the current credential, if any.
    pub fn get(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the current credential or an authentication error.
    pub fn require(&self) -> ProviderResult<Credential> {
        self.get()
            .ok_or_else(|| ProviderError::authentication("not authenticated"))
    }

    /// Returns true if a credential is held.
    pub fn is_present(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Removes the credential from memory and disk.
    pub fn clear(&self) -> ProviderResult<()> {
        *self.write_guard() = None;
        if let Some(path) = self.path.as_deref()
            && path.exists()
        {
            fs::remove_file(path).map_err(|e| {
                ProviderError::configuration(format!("failed to remove credential file: {}", e))
            })?;
            info!("cleared credential at {:?}", path);
        }
        Ok(())
    }

    /// Returns the backing file path, if persistent.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credential>> {
        self.credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writes the credential atomically with owner-only permissions.
fn save(path: &Path, credential: &Credential) -> ProviderResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ProviderError::configuration(format!("failed to create credential directory: {}", e))
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(credential)
        .map_err(|e| ProviderError::internal(format!("failed to serialize credential: {}", e)))?;

    fs::write(&temp_path, &content).map_err(|e| {
        ProviderError::configuration(format!("failed to write credential file: {}", e))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        ProviderError::configuration(format!("failed to rename credential file: {}", e))
    })?;

    debug!("saved credential to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(token: &str) -> Credential {
        Credential::new(token, "https://oauth2.googleapis.com/token")
            .with_refresh_token("refresh")
            .with_client("id.apps.googleusercontent.com", "secret")
            .with_scopes(["scope-a", "scope-b"])
    }

    #[test]
    fn usable_requires_token_and_endpoint() {
        assert!(credential("abc").ensure_usable().is_ok());

        let err = credential("").ensure_usable().unwrap_err();
        assert!(err.is_auth());

        let err = Credential::new("abc", " ").ensure_usable().unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", credential("super-secret-token"));
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("oauth2.googleapis.com"));
    }

    #[test]
    fn scope_check() {
        let c = credential("abc");
        assert!(c.has_scopes(&["scope-a".to_string()]));
        assert!(!c.has_scopes(&["scope-c".to_string()]));
    }

    #[test]
    fn set_overwrites_and_clear_removes() {
        let store = CredentialStore::in_memory();
        assert!(store.get().is_none());
        assert!(store.require().unwrap_err().is_auth());

        store.set(credential("first")).unwrap();
        store.set(credential("second")).unwrap();
        assert_eq!(store.get().unwrap().access_token, "second");
        assert!(store.is_present());

        store.clear().unwrap();
        assert!(store.get().is_none());
        assert!(!store.is_present());
    }

    #[test]
    fn in_memory_load_is_noop() {
        let store = CredentialStore::in_memory();
        assert!(!store.load().unwrap());
        assert!(store.path().is_none());
    }

    #[test]
    fn persistent_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credential.json");

        let store = CredentialStore::persistent(&path);
        store.set(credential("persisted")).unwrap();
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let reloaded = CredentialStore::persistent(&path);
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.get().unwrap(), credential("persisted"));
    }

    #[test]
    fn persistent_clear_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");

        let store = CredentialStore::persistent(&path);
        store.set(credential("abc")).unwrap();
        store.clear().unwrap();

        assert!(!path.exists());
        assert!(!CredentialStore::persistent(&path).load().unwrap());
    }

    #[test]
    fn reload_follows_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");

        let store = CredentialStore::persistent(&path);
        store.set(credential("first")).unwrap();

        // Another process logs in again, then logs out.
        CredentialStore::persistent(&path).set(credential("second")).unwrap();
        assert!(store.load().unwrap());
        assert_eq!(store.get().unwrap().access_token, "second");

        CredentialStore::persistent(&path).clear().unwrap();
        assert!(!store.load().unwrap());
        assert!(!store.is_present());
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");
        fs::write(&path, "not json").unwrap();

        let err = CredentialStore::persistent(&path).load().unwrap_err();
        assert_eq!(err.class(), crate::error::ErrorClass::Config);
    }
}
