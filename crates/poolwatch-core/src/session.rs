// ── Auth session manager ──
//
// Owns the authenticated/anonymous transition: login, logout, token
// refresh, startup restore, and teardown when the backend rejects the
// session. The bearer token itself lives in the adapter's `AuthHandle`;
// this module keeps it in sync with the persisted session and the
// reactive user slot.

use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use poolwatch_api::ApiClient;

use crate::error::CoreError;

// ── Session data ────────────────────────────────────────────────────

/// Login form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// The authenticated identity held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
}

/// What survives a restart: the bearer token and who it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

// ── SessionStore ────────────────────────────────────────────────────

/// Durable storage for the session.
///
/// `load` returns `Ok(None)` both for an absent session and for one the
/// implementation chose to discard (e.g. a corrupt file).
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError>;
    fn save(&self, session: &PersistedSession) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// In-memory store for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<PersistedSession>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError> {
        Ok(self.session.lock().expect("session lock poisoned").clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        *self.session.lock().expect("session lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.session.lock().expect("session lock poisoned") = None;
        Ok(())
    }
}

// ── SessionManager ──────────────────────────────────────────────────

/// Session lifecycle coordinator.
///
/// State machine: anonymous (no token in the `AuthHandle`) or
/// authenticated (token present, `UserInfo` in the user slot, session
/// persisted). Concurrent `check_auth`/`refresh_token` calls are not
/// serialized; the last response wins.
pub struct SessionManager<S: SessionStore> {
    api: ApiClient,
    store: S,
    user: watch::Sender<Option<UserInfo>>,
    error: watch::Sender<Option<String>>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        let (user, _) = watch::channel(None);
        let (error, _) = watch::channel(None);
        Self {
            api,
            store,
            user,
            error,
        }
    }

    // ── State queries ────────────────────────────────────────────────

    /// Whether a bearer token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.api.auth().has_token()
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.user.borrow().clone()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<UserInfo>> {
        self.user.subscribe()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.error.send_modify(|e| *e = None);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Prime the adapter and user slot from the persisted session.
    ///
    /// Called once at startup, before any store fetches. A store that
    /// fails to load is cleared so the bad state does not come back on
    /// the next start.
    pub fn restore(&self) {
        match self.store.load() {
            Ok(Some(session)) => {
                debug!(username = %session.username, "restored persisted session");
                self.api
                    .auth()
                    .set_token(SecretString::from(session.token));
                self.user.send_modify(|u| {
                    *u = Some(UserInfo {
                        username: session.username,
                    });
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to load persisted session, clearing it");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "failed to clear persisted session");
                }
            }
        }
    }

    /// Authenticate and install the session everywhere: adapter token,
    /// user slot, persisted store.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), CoreError> {
        match self
            .api
            .login(&credentials.username, &credentials.password)
            .await
        {
            Ok(resp) => {
                self.api
                    .auth()
                    .set_token(SecretString::from(resp.token.clone()));
                self.persist(&PersistedSession {
                    token: resp.token,
                    username: resp.username.clone(),
                    expires_at: resp.expires_at,
                });
                self.user.send_modify(|u| {
                    *u = Some(UserInfo {
                        username: resp.username,
                    });
                });
                self.error.send_modify(|e| *e = None);
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.error.send_modify(|slot| *slot = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// End the session.
    ///
    /// The remote logout is best-effort and only attempted while a token
    /// is held; local teardown is unconditional and never blocked by a
    /// failing remote call.
    pub async fn logout(&self) {
        if self.api.auth().has_token() {
            if let Err(e) = self.api.logout().await {
                debug!(error = %e, "remote logout failed, clearing local session anyway");
            }
        }
        self.teardown_local();
    }

    /// Exchange the current token for a fresh one.
    ///
    /// Returns `false` (after a full logout teardown) on any failure.
    pub async fn refresh_token(&self) -> bool {
        if !self.api.auth().has_token() {
            return false;
        }
        match self.api.refresh_token().await {
            Ok(resp) => {
                self.api
                    .auth()
                    .set_token(SecretString::from(resp.token.clone()));
                self.persist(&PersistedSession {
                    token: resp.token,
                    username: resp.username.clone(),
                    expires_at: resp.expires_at,
                });
                self.user.send_modify(|u| {
                    *u = Some(UserInfo {
                        username: resp.username,
                    });
                });
                true
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, logging out");
                self.teardown_local();
                false
            }
        }
    }

    /// Validate the current token against the backend.
    ///
    /// Without a token this answers `false` without a request. A valid
    /// token rehydrates the user slot; an invalid one tears the session
    /// down.
    pub async fn check_auth(&self) -> bool {
        if !self.api.auth().has_token() {
            return false;
        }
        match self.api.validate_token().await {
            Ok(info) => {
                // Re-persist so a restart picks up the rehydrated identity.
                if let Some(token) = self.api.auth().token() {
                    self.persist(&PersistedSession {
                        token: token.expose_secret().to_owned(),
                        username: info.username.clone(),
                        expires_at: info.expires_at,
                    });
                }
                self.user.send_modify(|u| {
                    *u = Some(UserInfo {
                        username: info.username,
                    });
                });
                true
            }
            Err(e) => {
                debug!(error = %e, "token validation failed, logging out");
                self.teardown_local();
                false
            }
        }
    }

    /// Run local teardown whenever the adapter observes a 401.
    ///
    /// The adapter already clears its in-memory token synchronously;
    /// this future handles the rest (user slot, persisted session).
    /// Intended to be spawned once and left running.
    pub async fn watch_unauthorized(&self) {
        let mut rx = self.api.auth().subscribe_unauthorized();
        while rx.changed().await.is_ok() {
            warn!("backend rejected the session, clearing local state");
            self.teardown_local();
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn teardown_local(&self) {
        self.api.auth().clear_token();
        self.user.send_modify(|u| *u = None);
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    fn persist(&self, session: &PersistedSession) {
        if let Err(e) = self.store.save(session) {
            warn!(error = %e, "failed to persist session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemorySessionStore::default();
        assert!(store.load().unwrap().is_none());

        store
            .save(&PersistedSession {
                token: "tok".into(),
                username: "alice".into(),
                expires_at: None,
            })
            .unwrap();
        assert_eq!(store.load().unwrap().unwrap().username, "alice");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
