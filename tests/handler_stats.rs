mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{create_split, create_test_app};
use serde_json::Value;
use url_splitter::domain::entities::{NewClickEvent, RequestMetadata};
use url_splitter::infrastructure::Storage;

const A: &str = "https://a.example/";
const B: &str = "https://b.example/";

async fn record(storage: &Storage, split_id: i64, url: &str, count: usize) {
    for _ in 0..count {
        storage
            .clicks
            .record_click(NewClickEvent {
                split_id,
                destination_url: url.to_string(),
                clicked_at: Utc::now(),
                metadata: RequestMetadata::default(),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_split_stats_distribution() {
    let app = create_test_app();
    let split = create_split(&app.storage, "seventy", &[(A, 70.0), (B, 30.0)]).await;
    record(&app.storage, split.id, A, 7).await;
    record(&app.storage, split.id, B, 3).await;

    let response = app.server.get("/api/splits/seventy/stats").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_clicks"], 10);
    assert_eq!(body["recorded_clicks"], 10);
    assert_eq!(body["destinations"][0]["url"], A);
    assert_eq!(body["destinations"][0]["clicks"], 7);
    assert_eq!(body["destinations"][0]["percentage"], 70.0);
    assert_eq!(body["destinations"][0]["configured_percentage"], 70.0);
    assert_eq!(body["destinations"][1]["clicks"], 3);
    assert_eq!(body["destinations"][1]["percentage"], 30.0);
    assert!(body.get("other_destinations").is_none());
    assert_eq!(body["recent_clicks"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_split_stats_without_clicks() {
    let app = create_test_app();
    create_split(&app.storage, "quiet", &[(A, 1.0), (B, 1.0)]).await;

    let body: Value = app.server.get("/api/splits/quiet/stats").await.json();

    assert_eq!(body["recorded_clicks"], 0);
    assert_eq!(body["destinations"][0]["clicks"], 0);
    assert_eq!(body["destinations"][0]["percentage"], 0.0);
    assert_eq!(body["destinations"][0]["configured_percentage"], 50.0);
    assert!(body["recent_clicks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_split_stats_keeps_removed_destinations() {
    let app = create_test_app();
    let split = create_split(&app.storage, "rotated", &[(A, 1.0), (B, 1.0)]).await;
    record(&app.storage, split.id, A, 2).await;

    app.server
        .put("/api/splits/rotated")
        .json(&serde_json::json!({
            "destinations": [B, "https://c.example/"]
        }))
        .await
        .assert_status_ok();

    let body: Value = app.server.get("/api/splits/rotated/stats").await.json();

    assert_eq!(body["recorded_clicks"], 2);
    assert_eq!(body["other_destinations"][0]["url"], A);
    assert_eq!(body["other_destinations"][0]["clicks"], 2);
    assert_eq!(body["other_destinations"][0]["weight"], 0.0);
}

#[tokio::test]
async fn test_split_stats_recent_limit() {
    let app = create_test_app();
    let split = create_split(&app.storage, "recent", &[(A, 1.0), (B, 1.0)]).await;
    record(&app.storage, split.id, A, 5).await;

    let body: Value = app
        .server
        .get("/api/splits/recent/stats")
        .add_query_param("recent", 2)
        .await
        .json();
    assert_eq!(body["recent_clicks"].as_array().unwrap().len(), 2);

    let body: Value = app
        .server
        .get("/api/splits/recent/stats")
        .add_query_param("recent", 0)
        .await
        .json();
    assert!(body["recent_clicks"].as_array().unwrap().is_empty());
    assert_eq!(body["recorded_clicks"], 5);
}

#[tokio::test]
async fn test_split_stats_recent_out_of_range() {
    let app = create_test_app();
    create_split(&app.storage, "bounded", &[(A, 1.0), (B, 1.0)]).await;

    let response = app
        .server
        .get("/api/splits/bounded/stats")
        .add_query_param("recent", 101)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_split_stats_window_excludes_future() {
    let app = create_test_app();
    let split = create_split(&app.storage, "windowed", &[(A, 1.0), (B, 1.0)]).await;
    record(&app.storage, split.id, A, 3).await;

    let from = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let body: Value = app
        .server
        .get("/api/splits/windowed/stats")
        .add_query_param("from", &from)
        .await
        .json();

    assert_eq!(body["recorded_clicks"], 0);
    assert_eq!(body["total_clicks"], 3);
}

#[tokio::test]
async fn test_split_stats_inverted_window() {
    let app = create_test_app();
    create_split(&app.storage, "inverted", &[(A, 1.0), (B, 1.0)]).await;

    let response = app
        .server
        .get("/api/splits/inverted/stats")
        .add_query_param("from", "2026-02-01T00:00:00Z")
        .add_query_param("to", "2026-01-01T00:00:00Z")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_split_stats_not_found() {
    let app = create_test_app();

    app.server
        .get("/api/splits/nonexistent/stats")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_split_stats_readable_by_id_after_delete() {
    let app = create_test_app();
    let split = create_split(&app.storage, "archived", &[(A, 1.0), (B, 1.0)]).await;
    record(&app.storage, split.id, B, 4).await;

    app.server
        .delete("/api/splits/archived")
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(&format!("/api/splits/{}/stats", split.id))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_active"], false);
    assert_eq!(body["destinations"][1]["clicks"], 4);
}
