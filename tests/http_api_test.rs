mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Request, StatusCode};
use tokio::sync::mpsc;
use tower::ServiceExt;

use goodsin_api::config::AppConfig;
use goodsin_api::events::EventSender;
use goodsin_api::handlers::AppServices;
use goodsin_api::{api_v1_routes, AppState};

use common::{seed_shipment, setup_db};

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        log_level: "info".into(),
        log_json: false,
        auto_migrate: false,
        pos_sync_url: None,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
        receive_lock_wait_secs: 5,
        event_channel_capacity: 16,
        request_timeout_secs: 5,
    }
}

async fn test_app() -> (Router, Arc<sea_orm::DatabaseConnection>) {
    let db = setup_db().await;
    let (event_tx, _event_rx) = mpsc::channel(16);
    let event_sender = EventSender::new(event_tx);
    let services = AppServices::new(
        db.clone(),
        event_sender.clone(),
        None,
        std::time::Duration::from_secs(5),
    );
    let state = AppState {
        db: db.clone(),
        config: test_config(),
        event_sender,
        services,
    };
    let app = Router::new()
        .merge(goodsin_api::handlers::health::routes())
        .nest("/api/v1", api_v1_routes())
        .with_state(state);
    (app, db)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_database_up() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["database"], "up");
}

#[tokio::test]
async fn receive_endpoint_honors_the_legacy_envelope() {
    let (app, db) = test_app().await;
    let id = seed_shipment(&db, "juice_transfer", "outlet-dst", &[("p1", 10), ("p2", 5), ("p3", 8)])
        .await;

    // Quantities arrive as strings and readonly as the legacy "false"; one
    // line is left blank and must stay pending.
    let response = app
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/receive", id),
            serde_json::json!({
                "staff_id": 42,
                "lines": [
                    {"product_id": "p1", "received": "10", "readonly": "false"},
                    {"product_id": "p2", "received": 5},
                    {"product_id": "p3", "received": ""}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["updated"], 2);
    assert_eq!(payload["pending"], 1);
    assert_eq!(payload["complete"], false);
}

#[tokio::test]
async fn receive_endpoint_rejects_negative_quantities() {
    let (app, db) = test_app().await;
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p1", 10)]).await;

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/receive", id),
            serde_json::json!({
                "staff_id": 42,
                "lines": [
                    {"product_id": "p1", "received": -2}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = json_body(response).await;
    assert_eq!(payload["error"], "Bad Request");
}

#[tokio::test]
async fn empty_submission_maps_to_unprocessable() {
    let (app, db) = test_app().await;
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p1", 10)]).await;

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/receive", id),
            serde_json::json!({
                "staff_id": 42,
                "lines": [
                    {"product_id": "p1", "received": ""}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unlock_endpoint_round_trip() {
    let (app, db) = test_app().await;
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p1", 2)]).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/receive", id),
            serde_json::json!({
                "staff_id": 42,
                "lines": [{"product_id": "p1", "received": 2}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["complete"], true);

    // A second submission conflicts with the completed document.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/receive", id),
            serde_json::json!({
                "staff_id": 42,
                "lines": [{"product_id": "p1", "received": 2}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/unlock", id),
            serde_json::json!({"staff_id": 42}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["success"], true);
}

#[tokio::test]
async fn lock_conflict_returns_409_with_holder_message() {
    let (app, db) = test_app().await;
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p1", 2)]).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/lock", id),
            serde_json::json!({"staff_id": 7, "session_id": "sess-a"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/shipments/{}/lock", id),
            serde_json::json!({"staff_id": 8, "session_id": "sess-b"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let payload = json_body(response).await;
    let message = payload["message"].as_str().unwrap();
    assert!(message.contains('7'), "holder id in message: {}", message);
}

#[tokio::test]
async fn get_shipment_returns_header_and_lines() {
    let (app, db) = test_app().await;
    let id = seed_shipment(&db, "stock_transfer", "outlet-dst", &[("p1", 3), ("p2", 4)]).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/shipments/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["shipment"]["kind"], "stock_transfer");
    assert_eq!(payload["shipment"]["status"], "draft");
    assert_eq!(payload["lines"].as_array().unwrap().len(), 2);
}
