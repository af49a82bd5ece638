mod common;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use common::{field_errors, response_json, TestApp};

#[tokio::test]
async fn status_endpoint() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["data"]["status"], "ok");
    assert_eq!(payload["data"]["service"], "procure-ease");
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["data"]["status"], "up");
    assert_eq!(payload["data"]["database"]["status"], "up");

    let response = app.get("/api/v1/health/live").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .uri("/api/v1/vendors/77")
                .header("x-request-id", "test-trace-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "test-trace-1");
    let payload = response_json(response).await;
    assert_eq!(payload["error"], "Not Found");
    assert_eq!(payload["request_id"], "test-trace-1");

    let response = app.get("/api/v1/status").await;
    let generated = response.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(!generated.is_empty());
    let payload = response_json(response).await;
    assert_eq!(payload["meta"]["request_id"], generated);
}

#[tokio::test]
async fn malformed_json_is_a_body_error() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/vendors")
                .header("content-type", "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert_eq!(payload["message"], "The given data was invalid");
    assert!(!field_errors(&payload, "body").is_empty());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["info"]["title"], "ProcureEase API");
    assert!(payload["paths"]["/api/v1/purchase-orders/{id}/approve"].is_object());
    assert!(payload["paths"]["/api/v1/invoices/{id}/pay"].is_object());
}

#[tokio::test]
async fn frontend_is_served_from_root() {
    let app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("ProcureEase"));
}

#[tokio::test]
async fn unknown_api_path_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_are_exported_in_prometheus_format() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/api/v1/health").await.status(), StatusCode::OK);

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("procure_ease_db_max_connections"));
    assert!(text.contains("procure_ease_db_ping_duration"));
}
