//! Integration tests for the health endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use knightwire_core::connection::Connection;
use knightwire_test_support::RecordingConnection;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let (app, _registry) = common::build_test_app();

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_health_counts_live_sessions() {
    // Arrange
    let (app, registry) = common::build_test_app();
    for _ in 0..2 {
        registry.register(Arc::new(RecordingConnection::new()) as Arc<dyn Connection>);
    }

    // Act
    let (status, json) = common::get_json(app, "/health").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessions"], 2);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (app, _registry) = common::build_test_app();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
