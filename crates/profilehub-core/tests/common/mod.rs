//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use profilehub_core::auth::{MemoryTokenStore, Session, Tokens};
use profilehub_core::ApiClient;
use serde_json::json;
use wiremock::{MockServer, Request, ResponseTemplate};

/// Client against `server` whose session starts with `tokens`.
pub fn client_with(server: &MockServer, tokens: Tokens) -> ApiClient {
    let session = Arc::new(Session::new(MemoryTokenStore::with_tokens(tokens)));
    ApiClient::new(format!("{}/api", server.uri()), session).expect("build api client")
}

pub fn access_only(access: &str) -> Tokens {
    Tokens {
        access: Some(access.to_string()),
        refresh: None,
    }
}

pub fn profile_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "email": "a@b.com", "bio": "Hello" }))
}

pub fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401)
        .set_body_json(json!({ "detail": "Given token not valid for any token type" }))
}

/// Authorization header of a recorded request, if any.
pub fn authorization(req: &Request) -> Option<String> {
    req.headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Recorded requests whose path equals `path`.
pub async fn requests_to(server: &MockServer, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.url.path() == path)
        .collect()
}
