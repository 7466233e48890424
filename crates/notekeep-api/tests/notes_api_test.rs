//! Integration tests for the notes HTTP API.
//!
//! Drives the router in-process with `oneshot` against an in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use notekeep_api::{build_router, AppState};
use notekeep_store::{Store, Username};

struct TestApp {
    router: Router,
    store: Store,
}

impl TestApp {
    fn new() -> Self {
        let store = Store::in_memory();
        let router = build_router(AppState::new(store.clone()));
        Self { router, store }
    }

    async fn token_for(&self, name: &str) -> String {
        let username = Username::parse(name).unwrap();
        self.store.notes.ensure(&username).await.unwrap();
        self.store.tokens.issue(&username).await.unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send(method, uri, token, body).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create(&self, token: &str, body: Value) -> Value {
        let (status, value) = self
            .json(Method::POST, "/api/v1/notes/create", Some(token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {value}");
        value
    }
}

// =============================================================================
// LIVENESS AND STATUS
// =============================================================================

#[tokio::test]
async fn test_root_is_plaintext_liveness() {
    let app = TestApp::new();
    let (status, _, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "notekeep server running");
}

#[tokio::test]
async fn test_status_reports_authentication() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let (status, body) = app.json(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok_unauthenticated");
    assert!(body["message"].is_string());

    let (status, body) = app
        .json(Method::GET, "/api/v1/status", Some("wrong-token"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok_unauthenticated");

    let (status, body) = app
        .json(Method::GET, "/api/v1/status", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok_authenticated");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();
    let (_, headers, _) = app.send(Method::GET, "/", None, None).await;
    let id = headers.get("x-request-id").expect("x-request-id header");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let app = TestApp::new();
    app.token_for("alice").await;

    let (status, headers, body) = app
        .send(Method::GET, "/api/v1/notes/", Some("wrong-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_or_malformed_header_is_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app.json(Method::GET, "/api/v1/notes/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/v1/notes/")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cGFzcw==")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_is_checked_before_body() {
    let app = TestApp::new();
    let (status, _) = app
        .json(Method::POST, "/api/v1/notes/create", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_token_stops_working() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    app.store.tokens.revoke(&token).await.unwrap();

    let (status, _) = app
        .json(Method::GET, "/api/v1/notes/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// CREATE
// =============================================================================

#[tokio::test]
async fn test_create_note() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let body = app
        .create(&token, json!({"title": "Groceries", "content": "milk, eggs"}))
        .await;
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["title"], "Groceries");
    assert!(body["updated_at"].is_string());
    assert!(body.get("content").is_none());
}

#[tokio::test]
async fn test_create_without_title_is_untitled() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let body = app.create(&token, json!({"content": ""})).await;
    assert_eq!(body["title"], "Untitled Note");

    let body = app.create(&token, json!({"title": "   ", "content": "x"})).await;
    assert_eq!(body["title"], "Untitled Note");
}

#[tokio::test]
async fn test_create_requires_content() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let (status, body) = app
        .json(Method::POST, "/api/v1/notes/create", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/notes/create",
            Some(&token),
            Some(json!({"title": "only a title"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/notes/create")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/notes/create",
            Some(&token),
            Some(json!({"content": 42})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_oversized_body() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let content = "x".repeat(2 * 1024 * 1024);
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/notes/create",
            Some(&token),
            Some(json!({"title": "big", "content": content})),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("length limit"));

    let (_, list) = app
        .json(Method::GET, "/api/v1/notes/", Some(&token), None)
        .await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_created_ids_are_unique() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let mut ids = std::collections::HashSet::new();
    for i in 0..20 {
        let body = app
            .create(&token, json!({"content": format!("note {i}")}))
            .await;
        assert!(ids.insert(body["id"].as_str().unwrap().to_string()));
    }
}

// =============================================================================
// LIST AND GET
// =============================================================================

#[tokio::test]
async fn test_fresh_user_lists_empty() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/notes/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_returns_summaries_in_order() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    app.create(&token, json!({"title": "first", "content": "a"})).await;
    app.create(&token, json!({"title": "second", "content": "b"})).await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/notes", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let notes = body.as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["title"], "first");
    assert_eq!(notes[1]["title"], "second");
    assert!(notes[0].get("content").is_none());
}

#[tokio::test]
async fn test_get_returns_full_note() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let created = app
        .create(&token, json!({"title": "Groceries", "content": "milk, eggs"}))
        .await;
    let id = created["id"].as_str().unwrap();

    for uri in [format!("/api/v1/notes/{id}/"), format!("/api/v1/notes/{id}")] {
        let (status, note) = app.json(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(note["id"], id);
        assert_eq!(note["title"], "Groceries");
        assert_eq!(note["content"], "milk, eggs");
        assert_eq!(note["created_at"], note["updated_at"]);
    }
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/notes/does-not-exist/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// =============================================================================
// UPDATE
// =============================================================================

#[tokio::test]
async fn test_update_title_only_keeps_content() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let created = app
        .create(&token, json!({"title": "old", "content": "body"}))
        .await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/notes/{id}/");

    let (_, before) = app.json(Method::GET, &uri, Some(&token), None).await;

    let (status, summary) = app
        .json(Method::PUT, &uri, Some(&token), Some(json!({"title": "new"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["id"], id);
    assert_eq!(summary["title"], "new");

    let (_, after) = app.json(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(after["content"], "body");
    assert_eq!(after["created_at"], before["created_at"]);
    let before_updated: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(before["updated_at"].clone()).unwrap();
    let after_updated: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(after["updated_at"].clone()).unwrap();
    assert!(after_updated >= before_updated);
}

#[tokio::test]
async fn test_update_content_only_keeps_title() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let created = app
        .create(&token, json!({"title": "keep", "content": "old"}))
        .await;
    let uri = format!("/api/v1/notes/{}", created["id"].as_str().unwrap());

    let (status, _) = app
        .json(Method::PUT, &uri, Some(&token), Some(json!({"content": "new"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, note) = app.json(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(note["title"], "keep");
    assert_eq!(note["content"], "new");
}

#[tokio::test]
async fn test_update_without_fields_is_bad_request() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let created = app.create(&token, json!({"content": "x"})).await;
    let uri = format!("/api/v1/notes/{}/", created["id"].as_str().unwrap());

    let (status, _) = app
        .json(Method::PUT, &uri, Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"title": "", "content": "  "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let (status, _) = app
        .json(
            Method::PUT,
            "/api/v1/notes/missing/",
            Some(&token),
            Some(json!({"title": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// DELETE
// =============================================================================

#[tokio::test]
async fn test_delete_twice() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let created = app.create(&token, json!({"content": "x"})).await;
    let uri = format!("/api/v1/notes/{}/", created["id"].as_str().unwrap());

    let (status, body) = app.json(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = app.json(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app
        .json(Method::GET, "/api/v1/notes/", Some(&token), None)
        .await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let (status, _) = app
        .json(Method::DELETE, "/api/v1/notes/nope", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// ISOLATION
// =============================================================================

#[tokio::test]
async fn test_users_cannot_see_each_others_notes() {
    let app = TestApp::new();
    let alice = app.token_for("alice").await;
    let bob = app.token_for("bobby").await;

    let created = app
        .create(&alice, json!({"title": "secret", "content": "alice only"}))
        .await;
    let uri = format!("/api/v1/notes/{}/", created["id"].as_str().unwrap());

    let (_, list) = app.json(Method::GET, "/api/v1/notes/", Some(&bob), None).await;
    assert_eq!(list, json!([]));

    let (status, _) = app.json(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(Method::PUT, &uri, Some(&bob), Some(json!({"title": "pwned"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.json(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, note) = app.json(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["title"], "secret");
}

#[tokio::test]
async fn test_concurrent_creates_are_not_lost() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let router = app.router.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/v1/notes/create")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"content": format!("n{i}")}).to_string()))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let (_, list) = app
        .json(Method::GET, "/api/v1/notes/", Some(&token), None)
        .await;
    assert_eq!(list.as_array().unwrap().len(), 16);
}
