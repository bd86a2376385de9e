//! Authentication state shared by all clones of a connection.

use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

/// How to initiate authentication. The three modes are mutually exclusive.
#[derive(Clone)]
pub enum AuthMode {
    /// OAuth password grant. The password may carry an appended security
    /// token per remote-store convention; it is sent verbatim.
    Password { username: String, password: String },
    /// An access token and instance URL obtained out of band. No network
    /// call is made.
    ExternalToken { token: String, instance_url: String },
    /// A provider-supplied credential bundle, as produced by a web OAuth
    /// dance. Token, instance URL, refresh token, and user/org identifiers
    /// are extracted from known nested paths.
    Delegated(serde_json::Value),
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            AuthMode::ExternalToken { instance_url, .. } => f
                .debug_struct("ExternalToken")
                .field("token", &"[REDACTED]")
                .field("instance_url", instance_url)
                .finish(),
            AuthMode::Delegated(_) => f.debug_struct("Delegated").finish_non_exhaustive(),
        }
    }
}

/// Mutable authentication state.
///
/// Once any authenticated call has succeeded, `access_token` and
/// `instance_url` are non-empty. The renewal protocol replaces
/// `access_token` with a single assignment under the write lock, so
/// concurrent readers see either the old or the new token, never a
/// partial value.
#[derive(Default)]
pub(crate) struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub instance_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_id: Option<String>,
    pub org_id: Option<String>,
}

/// Shared handle to the authentication state. Cloning a [`Session`] yields
/// a handle to the same state, so a token renewed through one clone is
/// visible to all.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read().expect("session lock poisoned");
        f.debug_struct("Session")
            .field("access_token", &state.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &state.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("instance_url", &state.instance_url)
            .field("user_id", &state.user_id)
            .field("org_id", &state.org_id)
            .finish()
    }
}

impl Session {
    /// Create an empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        f(&self.inner.read().expect("session lock poisoned"))
    }

    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        f(&mut self.inner.write().expect("session lock poisoned"))
    }

    /// The current access token, if authenticated.
    pub fn access_token(&self) -> Option<String> {
        self.read(|s| s.access_token.clone())
    }

    /// The current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.read(|s| s.refresh_token.clone())
    }

    /// The authenticated instance base URL, if any.
    pub fn instance_url(&self) -> Option<String> {
        self.read(|s| s.instance_url.clone())
    }

    /// The authenticated user's identifier, if known.
    pub fn user_id(&self) -> Option<String> {
        self.read(|s| s.user_id.clone())
    }

    /// The authenticated user's organization identifier, if known.
    pub fn org_id(&self) -> Option<String> {
        self.read(|s| s.org_id.clone())
    }

    /// Returns true once an access token and instance URL are held.
    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.access_token.is_some() && s.instance_url.is_some())
    }

    /// Replace the access token in a single assignment.
    pub(crate) fn replace_access_token(&self, token: String) {
        self.write(|s| s.access_token = Some(token));
    }
}

/// Response body of a token grant.
#[derive(Clone, serde::Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub instance_url: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Identity URL whose trailing path segments are the org and user ids.
    #[serde(default)]
    pub id: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("instance_url", &self.instance_url)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("id", &self.id)
            .finish()
    }
}

impl TokenResponse {
    /// Recover `(org_id, user_id)` from the identity URL, e.g.
    /// `https://login.salesforce.com/id/00Dx0/005xyz` -> `(00Dx0, 005xyz)`.
    pub fn identity(&self) -> (Option<String>, Option<String>) {
        let Some(id_url) = self.id.as_deref() else {
            return (None, None);
        };
        let mut segments: Vec<&str> = id_url.split('/').filter(|s| !s.is_empty()).collect();
        let user_id = segments.pop().map(str::to_string);
        let org_id = segments.pop().map(str::to_string);
        (org_id, user_id)
    }
}

/// Extract the credentials carried by a delegated provider bundle.
///
/// The bundle mirrors what web-auth middleware hands back: token material
/// under `credentials`, user identifiers under `extra.user_hash`.
pub(crate) fn delegated_credentials(
    bundle: &serde_json::Value,
) -> Result<(String, String, Option<String>, Option<String>, Option<String>)> {
    let token = bundle
        .pointer("/credentials/token")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    let instance_url = bundle
        .pointer("/credentials/instance_url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());

    let (Some(token), Some(instance_url)) = (token, instance_url) else {
        return Err(Error::argument(
            "delegated credential bundle must carry credentials.token and credentials.instance_url",
        ));
    };

    let refresh_token = bundle
        .pointer("/credentials/refresh_token")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let user_id = bundle
        .pointer("/extra/user_hash/user_id")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let org_id = bundle
        .pointer("/extra/user_hash/organization_id")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok((
        token.to_string(),
        instance_url.to_string(),
        refresh_token,
        user_id,
        org_id,
    ))
}
