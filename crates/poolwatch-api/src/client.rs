// Dashboard API HTTP client
//
// Wraps `reqwest::Client` with bearer-token injection, oversized-id
// normalization, and `{code, data, message}` envelope unwrapping. All
// endpoint groups (pools, status, virtual pools, auth, system) are
// implemented as inherent methods via separate files to keep this module
// focused on transport mechanics.

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::ApiEnvelope;
use crate::normalize::quote_large_ids;
use crate::transport::TransportConfig;

// ── AuthHandle ──────────────────────────────────────────────────────

/// Shared bearer-token slot.
///
/// The client reads it on every request; the session manager writes it
/// on login/refresh/logout. On a 401 the client clears the slot itself
/// and bumps the `unauthorized` channel so the session owner can tear
/// down persisted state -- in-memory deauthentication is synchronous,
/// persistence cleanup is the subscriber's job.
pub struct AuthHandle {
    token: RwLock<Option<SecretString>>,
    unauthorized: watch::Sender<u64>,
}

impl AuthHandle {
    pub fn new() -> Self {
        let (unauthorized, _) = watch::channel(0);
        Self {
            token: RwLock::new(None),
            unauthorized,
        }
    }

    /// Install a new bearer token.
    pub fn set_token(&self, token: SecretString) {
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    /// Drop the current token. Subsequent requests carry no auth header.
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    /// Whether a token is currently held.
    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    /// Clone of the current token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// Subscribe to 401 notifications. The value is a counter; every
    /// observed 401 bumps it.
    pub fn subscribe_unauthorized(&self) -> watch::Receiver<u64> {
        self.unauthorized.subscribe()
    }

    fn signal_unauthorized(&self) {
        self.clear_token();
        self.unauthorized.send_modify(|n| *n += 1);
    }
}

impl Default for AuthHandle {
    fn default() -> Self {
        Self::new()
    }
}

// ── ApiClient ───────────────────────────────────────────────────────

/// Raw HTTP client for the dashboard backend.
///
/// Handles the `{code, data, message}` envelope and the `/api` base
/// path. All methods return unwrapped `data` payloads -- the envelope is
/// stripped before the caller sees it. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<AuthHandle>,
}

impl ApiClient {
    /// Create a new client from a base URL and transport config.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            auth: Arc::new(AuthHandle::new()),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            auth: Arc::new(AuthHandle::new()),
        }
    }

    /// The shared auth handle (token slot + unauthorized channel).
    pub fn auth(&self) -> &Arc<AuthHandle> {
        &self.auth
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {url}");
        let builder = self.http.get(url);
        self.execute(builder).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {url}");
        let builder = self.http.get(url).query(query);
        self.execute(builder).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");
        let builder = self.http.post(url).json(body);
        self.execute(builder).await
    }

    /// POST with no request body (logout, refresh).
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");
        let builder = self.http.post(url);
        self.execute(builder).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("PUT {url}");
        let builder = self.http.put(url).json(body);
        self.execute(builder).await
    }

    pub(crate) async fn put_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("PUT {url}");
        let builder = self.http.put(url).query(query);
        self.execute(builder).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("DELETE {url}");
        let builder = self.http.delete(url);
        self.execute(builder).await
    }

    pub(crate) async fn delete_with_body<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("DELETE {url}");
        let builder = self.http.delete(url).json(body);
        self.execute(builder).await
    }

    // ── Envelope handling ────────────────────────────────────────────

    /// Attach the bearer token (when held), send, and unwrap the envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let builder = match self.auth.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        };

        let resp = builder.send().await.map_err(Error::Transport)?;
        self.parse_envelope(resp).await
    }

    /// Map HTTP status codes, then parse the `{code, data, message}`
    /// envelope, returning `data` on `code == 200` or `Error::Business`
    /// otherwise.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("received 401 -- clearing bearer token");
            self.auth.signal_unauthorized();
            return Err(Error::Unauthorized);
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Forbidden);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }
        if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR {
            let message = backend_message(&resp.text().await.unwrap_or_default())
                .unwrap_or_else(|| "internal server error".into());
            return Err(Error::Internal { message });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let envelope: Option<ApiEnvelope<serde_json::Value>> =
                serde_json::from_str(&body).ok();
            return Err(Error::Request {
                status: status.as_u16(),
                message: envelope
                    .as_ref()
                    .and_then(|e| e.message.clone())
                    .unwrap_or_else(|| format!("HTTP {status}")),
                code: envelope.map(|e| e.code),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        // Quote oversized ids before any numeric value loses precision.
        let fixed = quote_large_ids(&body);

        let envelope: ApiEnvelope<T> = serde_json::from_str(fixed.as_ref()).map_err(|e| {
            let preview = truncate_on_char_boundary(&body, 200);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if envelope.code != 200 {
            return Err(Error::Business {
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "business operation failed".into()),
            });
        }

        match envelope.data {
            Some(data) => Ok(data),
            // Void endpoints omit `data`; let `T = Option<...>` absorb it.
            None => serde_json::from_value(serde_json::Value::Null).map_err(|e| {
                Error::Deserialization {
                    message: format!("envelope has no data field: {e}"),
                    body,
                }
            }),
        }
    }
}

/// Best-effort extraction of the backend `message` from an error body.
fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|e| e.message)
}

/// Truncate to at most `max` bytes without splitting a multibyte
/// character; backend messages are not ASCII-only.
fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    let mut cut = s.len().min(max);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    &s[..cut]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::truncate_on_char_boundary;

    #[test]
    fn preview_truncation_respects_char_boundaries() {
        let body: String = std::iter::once('[').chain(std::iter::repeat_n('好', 100)).collect();
        let preview = truncate_on_char_boundary(&body, 200);
        assert!(preview.len() <= 200);
        assert!(body.starts_with(preview));

        assert_eq!(truncate_on_char_boundary("short", 200), "short");
        assert_eq!(truncate_on_char_boundary("héllo", 2), "h");
    }
}
