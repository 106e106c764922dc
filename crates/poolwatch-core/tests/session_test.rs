#![allow(clippy::unwrap_used)]
// Session lifecycle tests against a mock backend.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use poolwatch_api::ApiClient;
use poolwatch_core::store::DirectoryStore;
use poolwatch_core::{
    Credentials, MemorySessionStore, PageQuery, PersistedSession, SessionManager, SessionStore,
};

async fn setup() -> (MockServer, ApiClient, SessionManager<MemorySessionStore>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    let manager = SessionManager::new(client.clone(), MemorySessionStore::default());
    (server, client, manager)
}

fn ok_envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": 200, "message": "ok", "data": data })
}

fn credentials() -> Credentials {
    Credentials {
        username: "alice".into(),
        password: SecretString::from("hunter2".to_string()),
    }
}

#[tokio::test]
async fn login_installs_token_user_and_persisted_session() {
    let (server, client, manager) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "token": "tok-1",
            "username": "alice"
        }))))
        .mount(&server)
        .await;

    manager.login(&credentials()).await.unwrap();

    assert!(manager.is_authenticated());
    assert!(client.auth().has_token());
    assert_eq!(manager.user().unwrap().username, "alice");
    assert!(manager.error().is_none());
}

#[tokio::test]
async fn login_failure_records_error_and_stays_anonymous() {
    let (server, _client, manager) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1001,
            "message": "bad credentials"
        })))
        .mount(&server)
        .await;

    let err = manager.login(&credentials()).await.unwrap_err();
    assert_eq!(err.code_str(), "BUSINESS_ERROR");
    assert!(!manager.is_authenticated());
    assert!(manager.error().unwrap().contains("bad credentials"));
}

#[tokio::test]
async fn logout_clears_local_state_even_when_remote_call_fails() {
    let (server, client, _) = setup().await;
    let store = MemorySessionStore::default();
    store
        .save(&PersistedSession {
            token: "tok".into(),
            username: "alice".into(),
            expires_at: None,
        })
        .unwrap();
    let manager = SessionManager::new(client.clone(), store);
    manager.restore();
    assert!(manager.is_authenticated());

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    manager.logout().await;

    assert!(!manager.is_authenticated());
    assert!(manager.user().is_none());
    assert!(!client.auth().has_token());

    // The persisted session is gone too: restoring finds nothing.
    manager.restore();
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn logout_without_token_skips_the_remote_call() {
    let (server, _client, manager) = setup().await;

    manager.logout().await;

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn restore_primes_token_and_user() {
    let (_server, client, _unused) = setup().await;
    let store = MemorySessionStore::default();
    store
        .save(&PersistedSession {
            token: "tok".into(),
            username: "bob".into(),
            expires_at: None,
        })
        .unwrap();

    let manager = SessionManager::new(client.clone(), store);
    assert!(!manager.is_authenticated());

    manager.restore();
    assert!(manager.is_authenticated());
    assert_eq!(manager.user().unwrap().username, "bob");
}

#[tokio::test]
async fn check_auth_without_token_answers_false_without_a_request() {
    let (server, _client, manager) = setup().await;

    assert!(!manager.check_auth().await);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn check_auth_rehydrates_user_on_success() {
    let (server, client, manager) = setup().await;
    client.auth().set_token(SecretString::from("tok".to_string()));

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "username": "alice"
        }))))
        .mount(&server)
        .await;

    assert!(manager.check_auth().await);
    assert_eq!(manager.user().unwrap().username, "alice");
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn check_auth_failure_tears_the_session_down() {
    let (server, client, manager) = setup().await;
    client.auth().set_token(SecretString::from("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!manager.check_auth().await);
    assert!(!manager.is_authenticated());
    assert!(manager.user().is_none());
}

#[tokio::test]
async fn refresh_token_success_keeps_the_session() {
    let (server, client, manager) = setup().await;
    client.auth().set_token(SecretString::from("old".to_string()));

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "token": "new-tok",
            "username": "alice"
        }))))
        .mount(&server)
        .await;

    assert!(manager.refresh_token().await);
    assert!(manager.is_authenticated());
    assert_eq!(manager.user().unwrap().username, "alice");
}

#[tokio::test]
async fn refresh_token_failure_forces_logout() {
    let (server, client, manager) = setup().await;
    client.auth().set_token(SecretString::from("old".to_string()));

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!manager.refresh_token().await);
    assert!(!manager.is_authenticated());
    assert!(manager.user().is_none());
}

#[tokio::test]
async fn unauthorized_in_any_store_call_deauthenticates_the_session() {
    let (server, client, _unused) = setup().await;
    let store = MemorySessionStore::default();
    store
        .save(&PersistedSession {
            token: "tok".into(),
            username: "alice".into(),
            expires_at: None,
        })
        .unwrap();
    let manager = Arc::new(SessionManager::new(client.clone(), store));
    manager.restore();
    assert!(manager.is_authenticated());

    let watcher = Arc::clone(&manager);
    tokio::spawn(async move { watcher.watch_unauthorized().await });

    Mock::given(method("GET"))
        .and(path("/api/pools"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let directory = DirectoryStore::new(client.clone());
    let err = directory.fetch_pools(PageQuery::default()).await.unwrap_err();
    assert!(err.is_auth_expired());

    // The adapter cleared the shared token synchronously.
    assert!(!manager.is_authenticated());

    // The watcher tears down the rest (user slot, persisted session).
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(manager.user().is_none());
}
