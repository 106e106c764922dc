// Authentication endpoints.
//
// These are deliberately thin: the session state machine (persist,
// rehydrate, forced logout) lives in `poolwatch-core`. This layer only
// moves credentials and tokens over the wire.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{LoginResponse, TokenInfo};

impl ApiClient {
    /// `POST /auth/login` -- exchange credentials for a bearer token.
    ///
    /// Does NOT install the returned token; the caller decides whether
    /// the login sticks.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        debug!("logging in as {username}");
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        self.post("auth/login", &body).await
    }

    /// `POST /auth/logout` -- end the server-side session.
    pub async fn logout(&self) -> Result<(), Error> {
        self.post_empty::<Option<serde_json::Value>>("auth/logout")
            .await?;
        debug!("remote logout complete");
        Ok(())
    }

    /// `POST /auth/refresh` -- exchange the current token for a fresh one.
    pub async fn refresh_token(&self) -> Result<LoginResponse, Error> {
        self.post_empty("auth/refresh").await
    }

    /// `GET /auth/validate` -- check the current token and fetch its owner.
    pub async fn validate_token(&self) -> Result<TokenInfo, Error> {
        self.get("auth/validate").await
    }
}
