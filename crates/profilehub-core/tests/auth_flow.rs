//! Integration tests for login, signup and logout.

mod common;

use std::sync::Arc;

use common::{authorization, client_with, requests_to};
use profilehub_core::auth::{FileTokenStore, Session, TokenStore, Tokens, ValidationError};
use profilehub_core::{ApiClient, ApiError, Auth};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_stores_both_tokens_and_sets_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A1", "refresh": "R1" })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Auth::new(client_with(&server, Tokens::default()));
    assert!(!auth.is_authenticated());
    let state = auth.subscribe();

    auth.login("a@b.com", "x").await.expect("login");

    assert_eq!(auth.api().session().tokens().unwrap(), Tokens::new("A1", "R1"));
    assert!(auth.is_authenticated());
    assert!(*state.borrow());
}

#[tokio::test]
async fn test_login_with_bad_credentials_does_not_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(0)
        .mount(&server)
        .await;

    let auth = Auth::new(client_with(&server, Tokens::default()));
    let err = auth.login("a@b.com", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_login_validation_happens_before_dispatch() {
    let server = MockServer::start().await;
    let auth = Auth::new(client_with(&server, Tokens::default()));

    let err = auth.login("not-an-email", "x").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::InvalidEmail)));

    let err = auth.login("a@b.com", "").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::EmptyPassword)));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_signup_posts_credentials_without_logging_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .and(body_json(json!({ "email": "new@b.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "email": "new@b.com" })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Auth::new(client_with(&server, Tokens::default()));
    auth.signup(" new@b.com ", "pw").await.expect("signup");

    assert!(!auth.is_authenticated());
    assert!(auth.api().session().tokens().unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_rejection_keeps_server_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["user with this email already exists."]
        })))
        .mount(&server)
        .await;

    let auth = Auth::new(client_with(&server, Tokens::default()));
    let err = auth.signup("a@b.com", "pw").await.unwrap_err();

    assert!(matches!(err, ApiError::BadRequest(ref body) if body.contains("already exists")));
}

#[tokio::test]
async fn test_logout_always_leaves_store_empty() {
    let server = MockServer::start().await;

    let logged_in = Auth::new(client_with(&server, Tokens::new("A1", "R1")));
    assert!(logged_in.is_authenticated());
    logged_in.logout().unwrap();
    assert!(logged_in.api().session().tokens().unwrap().is_empty());
    assert!(!logged_in.is_authenticated());

    let refresh_only = Auth::new(client_with(
        &server,
        Tokens {
            access: None,
            refresh: Some("R1".to_string()),
        },
    ));
    refresh_only.logout().unwrap();
    assert!(refresh_only.api().session().tokens().unwrap().is_empty());

    let empty = Auth::new(client_with(&server, Tokens::default()));
    empty.logout().unwrap();
    assert!(empty.api().session().tokens().unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_failure_flips_flag_seen_by_facade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Auth::new(client_with(&server, Tokens::new("EXPIRED", "R1")));
    assert!(auth.is_authenticated());

    let err = auth.api().fetch_profile().await.unwrap_err();
    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_login_replaces_unreadable_session_file() {
    let dir = TempDir::new().unwrap();
    FileTokenStore::new(dir.path())
        .with_passphrase("old")
        .set(&Tokens::new("A0", "R0"))
        .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A1", "refresh": "R1" })))
        .expect(1)
        .mount(&server)
        .await;

    // Sealed file, no passphrase configured: reads fail
    let session = Arc::new(Session::new(FileTokenStore::new(dir.path())));
    assert!(!session.is_authenticated());
    let auth = Auth::new(ApiClient::new(format!("{}/api", server.uri()), session).unwrap());

    auth.login("a@b.com", "x").await.expect("login");

    let sent = requests_to(&server, "/api/token/").await;
    assert_eq!(sent.len(), 1);
    assert_eq!(authorization(&sent[0]), None);

    assert!(auth.is_authenticated());
    assert_eq!(auth.api().session().tokens().unwrap(), Tokens::new("A1", "R1"));
    assert_eq!(
        FileTokenStore::new(dir.path()).get().unwrap(),
        Tokens::new("A1", "R1")
    );
}
