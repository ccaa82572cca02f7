//! Error-path tests that need no database.
//!
//! The router here is backed by a lazily connected pool pointed at a closed
//! port, so every store call fails after a one-second acquire timeout. Requests
//! that are rejected before reaching the store (bad ids, malformed bodies)
//! never wait on it.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(json!(null)))
}

// == Store failures ===========================================================

#[tokio::test]
async fn store_failure_is_500_with_stable_payload() {
    let app = common::unreachable_app();
    let (status, json) = send(&app, "GET", "/chapters", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Failed to fetch chapters" }));
}

#[tokio::test]
async fn store_failure_does_not_leak_cause() {
    let app = common::unreachable_app();
    let (status, json) = send(&app, "GET", "/api/problems?search=gauss", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = json.to_string();
    assert_eq!(json["error"], "Failed to fetch problems");
    assert!(!text.contains("127.0.0.1"));
    assert!(!text.contains("timed out"));
}

#[tokio::test]
async fn store_failure_on_valid_id_is_500_not_404() {
    let app = common::unreachable_app();
    let uri = format!("/problems/{}", uuid::Uuid::new_v4());
    let (status, json) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to delete problem");
}

// == Rejected before the store ================================================

#[tokio::test]
async fn non_uuid_ids_are_404() {
    let app = common::unreachable_app();
    for (method, uri) in [
        ("GET", "/chapters/42"),
        ("DELETE", "/chapters/clx0abc"),
        ("GET", "/problems/not-an-id"),
        ("DELETE", "/api/problems/7"),
    ] {
        let (status, json) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert!(json["error"].as_str().unwrap().ends_with("not found"));
    }
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = common::unreachable_app();
    let (status, json) = send(&app, "POST", "/chapters", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn missing_required_field_is_400() {
    let app = common::unreachable_app();
    let (status, _) = send(&app, "POST", "/chapters", Some(r#"{"title":"Optics"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({
        "chapterId": uuid::Uuid::new_v4(),
        "title": "Lens Equation",
        "description": "...",
        "difficulty": "EASY",
    });
    let (status, _) = send(&app, "POST", "/problems", Some(&body.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_enum_values_in_body_are_400() {
    let app = common::unreachable_app();
    let uri = format!("/problems/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, "PUT", &uri, Some(r#"{"status":"DONE"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "PUT", &uri, Some(r#"{"difficulty":"hard"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_duration_is_400() {
    let app = common::unreachable_app();
    let uri = format!("/problems/{}", uuid::Uuid::new_v4());
    let (status, json) = send(&app, "PUT", &uri, Some(r#"{"duration":-1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("duration"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = common::unreachable_app();
    let (status, _) = send(&app, "GET", "/chapter", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Probes and middleware ====================================================

#[tokio::test]
async fn healthz_ok_without_database() {
    let app = common::unreachable_app();
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn readyz_is_503_without_database() {
    let app = common::unreachable_app();
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = common::unreachable_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn metrics_record_normalized_paths() {
    let app = common::unreachable_app();
    send(&app, "GET", "/chapters/42", None).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("catalog_http_request_duration_seconds"));
    assert!(text.contains("path=\"/chapters/:id\""));
    assert!(!text.contains("/chapters/42"));
}
