//! Auth/session boundary
//!
//! Sign-in, session persistence and sign-out are delegated to the hosted
//! auth provider; this module only holds the thin client and an explicit
//! session-lifecycle object. Everything else in the application is gated
//! on a loaded session: no session, no store or generation calls.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::{Result, SmartTaskError};

/// Opaque user object from the auth provider; only id and email are
/// relied upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Thin client for the hosted auth provider (session issue, session
/// validation, sign-out).
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.store_url.is_empty() || config.store_key.is_empty() {
            return Err(SmartTaskError::InvalidInput(
                "Store not configured. Set the ST_STORE_URL and ST_STORE_KEY environment variables."
                    .to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.store_url.trim_end_matches('/').to_string(),
            api_key: config.store_key.clone(),
        })
    }

    /// Exchange email + password for a session (password grant).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(SmartTaskError::AuthApi { status, body });
        }

        let session: Session = response.json().await?;
        Ok(session)
    }

    /// Validate a stored access token against the provider and return the
    /// user it belongs to.
    pub async fn fetch_user(&self, access_token: &str) -> Result<User> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(SmartTaskError::AuthApi { status, body });
        }

        let user: User = response.json().await?;
        Ok(user)
    }

    /// Revoke the session on the provider side. Local state is the
    /// caller's concern.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(SmartTaskError::AuthApi { status, body });
        }

        Ok(())
    }
}

/// Read a persisted session. A missing or unreadable file means
/// signed out.
pub fn load_session(path: &Path) -> Option<Session> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!("Ignoring corrupt session file {}: {}", path.display(), e);
            None
        },
    }
}

/// Persist a session for later invocations.
pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

pub fn clear_session(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Explicit session lifecycle: `init` loads persisted state and opens the
/// change channel, `current` snapshots it, `subscribe` hands out change
/// notifications, `teardown` disposes the owned subscription.
pub struct SessionManager {
    auth: AuthClient,
    path: PathBuf,
    tx: watch::Sender<Option<Session>>,
    /// The manager keeps one subscription alive so the channel never
    /// closes while it exists.
    _rx: watch::Receiver<Option<Session>>,
}

impl SessionManager {
    pub fn init(auth: AuthClient, path: PathBuf) -> Self {
        let initial = load_session(&path);
        let (tx, rx) = watch::channel(initial);
        Self {
            auth,
            path,
            tx,
            _rx: rx,
        }
    }

    /// Snapshot of the current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Change-notification subscription: receives the current session on
    /// every auth transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Sign in against the provider, persist the session and broadcast
    /// the transition.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_in(email, password).await?;
        save_session(&self.path, &session)?;
        self.tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign out: clear persisted state, notify the provider, broadcast.
    /// Provider-side revocation failure is logged but does not keep the
    /// local session alive.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.current() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                tracing::warn!("Provider sign-out failed: {}", e);
            }
        }
        clear_session(&self.path)?;
        self.tx.send_replace(None);
        Ok(())
    }

    /// Dispose the owned subscription handle.
    pub fn teardown(self) {}
}
