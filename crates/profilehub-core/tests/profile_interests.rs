//! Integration tests for profile and interest endpoints.

mod common;

use common::client_with;
use profilehub_core::auth::Tokens;
use profilehub_core::models::group_by_category;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalogue() -> serde_json::Value {
    json!([
        { "id": 1, "name": "Climbing", "category_name": "Outdoors" },
        { "id": 2, "name": "Chess", "category_name": "Games" },
        { "id": 3, "name": "Hiking", "category_name": "Outdoors" },
        { "id": 4, "name": "Jazz", "category_name": "Music" }
    ])
}

#[tokio::test]
async fn test_fetch_user_interests_and_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user-interests/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "interest_id": 2, "interest_name": "Chess", "category_name": "Games" },
            { "interest_id": 1, "interest_name": "Climbing", "category_name": "Outdoors" },
            { "interest_id": 4, "interest_name": "Go", "category_name": "Games" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Tokens::new("A1", "R1"));
    let interests = client.fetch_user_interests().await.expect("user interests");
    let groups = group_by_category(&interests);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].category, "Games");
    assert_eq!(groups[0].items.len(), 2);
    assert_eq!(groups[1].category, "Outdoors");
}

#[tokio::test]
async fn test_update_bio_sends_only_bio() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/profile/"))
        .and(body_json(json!({ "bio": "New bio" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@b.com", "bio": "New bio" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Tokens::new("A1", "R1"));
    let profile = client.update_bio("New bio").await.expect("bio update");
    assert_eq!(profile.bio, "New bio");
}

#[tokio::test]
async fn test_save_interest_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interests/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalogue()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user-interests/bulk-update/"))
        .and(body_json(json!([{ "interest_id": 4 }, { "interest_id": 1 }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Tokens::new("A1", "R1"));
    let saved = client
        .save_interest_selection(&[4, 1])
        .await
        .expect("save selection");

    let ids: Vec<i64> = saved.iter().map(|i| i.interest_id).collect();
    assert_eq!(ids, vec![1, 4]);
    assert_eq!(saved[1].interest_name, "Jazz");
    assert_eq!(saved[1].category_name, "Music");
}

#[tokio::test]
async fn test_failed_bulk_update_surfaces_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interests/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalogue()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user-interests/bulk-update/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_with(&server, Tokens::new("A1", "R1"));
    let err = client.save_interest_selection(&[1]).await.unwrap_err();
    assert!(matches!(err, profilehub_core::ApiError::ServerError(_)));
}
