//! HTTP-level scenarios for the applicant endpoints, driven through the
//! router against the in-memory backend.

use applicant_backend::config::CorsConfig;
use applicant_backend::storage::MemoryConnection;
use applicant_backend::{create_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn cors() -> CorsConfig {
    CorsConfig {
        allowed_origins: vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ],
    }
}

fn build_router() -> (Router, MemoryConnection) {
    let connection = MemoryConnection::new();
    let router = create_router(AppState::new(connection.clone()), &cors());
    (router, connection)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("router dispatch");
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, payload)
}

fn ahmed() -> Value {
    json!({
        "name": "Ahmed",
        "familyName": "Alaa",
        "address": "12 Nile St",
        "countryOfOrigin": "Egypt",
        "emailAddress": "ahmed@example.com",
        "age": 25
    })
}

#[tokio::test]
async fn create_get_delete_round_trip() {
    let (router, _) = build_router();

    let (status, created) = send(&router, "POST", "/api/applicants", Some(ahmed())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Applicant created successfully");
    assert_eq!(created["data"]["id"], 1);
    assert_eq!(created["data"]["hired"], false);
    assert_eq!(created["data"]["familyName"], "Alaa");
    assert_eq!(created["errors"], json!([]));

    let (status, fetched) = send(&router, "GET", "/api/applicants/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"], created["data"]);

    let (status, deleted) = send(&router, "DELETE", "/api/applicants/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], true);

    let (status, missing) = send(&router, "GET", "/api/applicants/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);
    assert_eq!(missing["message"], "Applicant with ID 1 not found");
    assert_eq!(missing["data"], Value::Null);
}

#[tokio::test]
async fn missing_applicant_is_404_for_get_put_and_delete() {
    let (router, _) = build_router();

    let mut body = ahmed();
    body["id"] = json!(9);
    body["hired"] = json!(true);

    for (method, payload) in [("GET", None), ("PUT", Some(body)), ("DELETE", None)] {
        let (status, response) = send(&router, method, "/api/applicants/9", payload).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(response["message"], "Applicant with ID 9 not found");
        assert_eq!(response["errors"], json!([]));
    }
}

#[tokio::test]
async fn update_replaces_fields() {
    let (router, _) = build_router();
    send(&router, "POST", "/api/applicants", Some(ahmed())).await;

    let (status, updated) = send(
        &router,
        "PUT",
        "/api/applicants/1",
        Some(json!({
            "id": 1,
            "name": "Ahmed",
            "familyName": "Alaa",
            "address": "",
            "countryOfOrigin": "Jordan",
            "emailAddress": "ahmed@example.com",
            "age": 26,
            "hired": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "Applicant updated successfully");
    assert_eq!(updated["data"]["countryOfOrigin"], "Jordan");
    assert_eq!(updated["data"]["address"], "");
    assert_eq!(updated["data"]["hired"], true);

    let (_, fetched) = send(&router, "GET", "/api/applicants/1", None).await;
    assert_eq!(fetched["data"], updated["data"]);
}

#[tokio::test]
async fn invalid_applicant_is_400_with_diagnostics() {
    let (router, connection) = build_router();

    let mut body = ahmed();
    body["familyName"] = json!("");
    let (status, response) = send(&router, "POST", "/api/applicants", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Error creating applicant");
    assert_eq!(response["errors"], json!(["FamilyName cannot be empty"]));
    assert!(connection.committed().await.is_empty());

    send(&router, "POST", "/api/applicants", Some(ahmed())).await;
    let mut update = ahmed();
    update["age"] = json!(-1);
    let (status, response) = send(&router, "PUT", "/api/applicants/1", Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Error updating applicant");
}

#[tokio::test]
async fn storage_failure_is_500() {
    let (router, connection) = build_router();
    connection
        .fail_reads(Some("database file is locked".to_string()))
        .await;

    let (status, listed) = send(&router, "GET", "/api/applicants", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(listed["message"], "Error retrieving applicants");
    assert_eq!(listed["errors"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(&router, "GET", "/api/applicants/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&router, "DELETE", "/api/applicants/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn list_supports_query_filters() {
    let (router, _) = build_router();
    send(&router, "POST", "/api/applicants", Some(ahmed())).await;
    let mut hired = ahmed();
    hired["familyName"] = json!("Haddad");
    hired["countryOfOrigin"] = json!("Syria");
    hired["age"] = json!(41);
    hired["hired"] = json!(true);
    send(&router, "POST", "/api/applicants", Some(hired)).await;

    let (status, all) = send(&router, "GET", "/api/applicants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["message"], "Applicants retrieved successfully");
    assert_eq!(all["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(all["data"][0]["id"], 1);

    let (status, filtered) = send(
        &router,
        "GET",
        "/api/applicants?hired=true&minAge=40&countryOfOrigin=Syria",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let filtered = filtered["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["familyName"], "Haddad");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let (router, _) = build_router();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/applicants")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("router dispatch");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:5173")
    );
}
