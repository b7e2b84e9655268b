mod common;

use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_check_healthy() {
    let app = common::create_test_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["storage"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "ok");
    assert_eq!(
        body["checks"]["click_queue"]["message"],
        "Free slots: 100 of 100"
    );
}

#[tokio::test]
async fn test_health_check_degraded_when_queue_closed() {
    let app = common::create_test_app();
    let common::TestApp {
        server, clicks_rx, ..
    } = app;
    drop(clicks_rx);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["storage"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "error");
}
