//! Webhook endpoint tests.
//!
//! Drives `POST /webhook` against a mock CRM: field validation, the
//! create-vs-update branch of the upsert, credential resolution, and error
//! surfacing for remote failures.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::{matchers, Mock, ResponseTemplate};

use common::{body_text, TestApp};
use hublink_core::{OauthToken, SessionId, TokenStore};

fn search_miss() -> serde_json::Value {
    json!({ "total": 0, "results": [] })
}

fn search_hit(id: &str) -> serde_json::Value {
    json!({
        "total": 1,
        "results": [{
            "id": id,
            "properties": { "email": "a@x.com", "firstname": "Old" }
        }]
    })
}

#[tokio::test]
async fn missing_fields_are_rejected_with_fixed_message() {
    let mut app = TestApp::start().await;
    app.config.hubspot_api_key = "test-key".to_string();

    for payload in [json!({}), json!({"email": "a@x.com"}), json!({"name": "Ann"})] {
        let response = app.post_webhook(payload).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing required fields: email and name.");
    }
}

#[tokio::test]
async fn unknown_email_creates_contact() {
    let mut app = TestApp::start().await;
    app.config.hubspot_api_key = "test-key".to_string();

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts/search"))
        .and(matchers::header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_miss()))
        .expect(1)
        .mount(&app.hubspot)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts"))
        .and(matchers::body_partial_json(json!({
            "properties": { "email": "a@x.com", "firstname": "Ann" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "451",
            "properties": { "email": "a@x.com", "firstname": "Ann" }
        })))
        .expect(1)
        .mount(&app.hubspot)
        .await;

    let response = app.post_webhook(json!({"email": "a@x.com", "name": "Ann"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Contact with email a@x.com created successfully.");
}

#[tokio::test]
async fn known_email_updates_contact_by_id() {
    let mut app = TestApp::start().await;
    app.config.hubspot_api_key = "test-key".to_string();

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_hit("123")))
        .mount(&app.hubspot)
        .await;

    Mock::given(matchers::method("PATCH"))
        .and(matchers::path("/crm/v3/objects/contacts/123"))
        .and(matchers::body_partial_json(json!({
            "properties": { "email": "a@x.com", "firstname": "Ann" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123",
            "properties": { "email": "a@x.com", "firstname": "Ann" }
        })))
        .expect(1)
        .mount(&app.hubspot)
        .await;

    // The upsert must not create a second record for a known email.
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.hubspot)
        .await;

    let response = app.post_webhook(json!({"email": "a@x.com", "name": "Ann"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Contact with email a@x.com updated successfully.");
}

#[tokio::test]
async fn crm_failure_surfaces_as_server_error() {
    let mut app = TestApp::start().await;
    app.config.hubspot_api_key = "test-key".to_string();

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&app.hubspot)
        .await;

    let response = app.post_webhook(json!({"email": "a@x.com", "name": "Ann"})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("upstream exploded"));
}

#[tokio::test]
async fn missing_credentials_fail_before_any_crm_call() {
    let app = TestApp::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_miss()))
        .expect(0)
        .mount(&app.hubspot)
        .await;

    let response = app.post_webhook(json!({"email": "a@x.com", "name": "Ann"})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("no HubSpot credentials available"));
}

#[tokio::test]
async fn oauth_token_takes_precedence_over_api_key() {
    let mut app = TestApp::start().await;
    app.config.hubspot_api_key = "test-key".to_string();

    app.store
        .store_token(
            SessionId::new(),
            OauthToken::new("tok-oauth".to_string(), Some("ref".to_string()), 21600),
        )
        .await
        .unwrap();

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts/search"))
        .and(matchers::header("authorization", "Bearer tok-oauth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_miss()))
        .expect(1)
        .mount(&app.hubspot)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/crm/v3/objects/contacts"))
        .and(matchers::header("authorization", "Bearer tok-oauth"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "451",
            "properties": { "email": "a@x.com", "firstname": "Ann" }
        })))
        .expect(1)
        .mount(&app.hubspot)
        .await;

    let response = app.post_webhook(json!({"email": "a@x.com", "name": "Ann"})).await;

    assert_eq!(response.status(), StatusCode::OK);
}
