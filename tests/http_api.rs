mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use spimex_trading::application::repos::{HealthRepo, TradingRepo};
use spimex_trading::config::QuerySettings;
use spimex_trading::infra::http::{ApiState, build_router};

use support::{FailingRepo, InMemoryTradingRepo, august_fixture, memory_service};

fn router_with(trading: Arc<dyn TradingRepo>, health: Arc<dyn HealthRepo>) -> Router {
    let (service, _) = memory_service(trading);
    build_router(ApiState {
        trading: Arc::new(service),
        health,
        query: QuerySettings::default(),
    })
}

async fn seeded_router() -> Router {
    let repo = InMemoryTradingRepo::seeded(august_fixture()).await;
    router_with(repo.clone(), repo)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

#[tokio::test]
async fn last_trading_dates_returns_dates_object() {
    let (status, body) = get(seeded_router().await, "/trading/last_trading_dates?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "dates": ["2024-08-09", "2024-08-08"] })
    );
}

#[tokio::test]
async fn non_numeric_limit_is_unprocessable() {
    let (status, body) = get(seeded_router().await, "/trading/last_trading_dates?limit=abc").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_input");
    assert!(
        body["error"]["hint"]
            .as_str()
            .expect("hint")
            .contains("limit")
    );
}

#[tokio::test]
async fn limit_above_maximum_is_unprocessable() {
    let (status, _) = get(
        seeded_router().await,
        "/trading/trading_results?limit=100000",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn trading_results_filters_and_omits_timestamps() {
    let (status, body) = get(
        seeded_router().await,
        "/trading/trading_results?oil_id=A592&delivery_type_id=",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["oil_id"], "A592");
    assert_eq!(rows[0]["date"], "2024-08-09");
    assert_eq!(rows[0]["total"], "5997120.00");
    assert!(rows[0].get("created_on").is_none());
    assert!(rows[0].get("updated_on").is_none());
}

#[tokio::test]
async fn dynamics_applies_date_range() {
    let (status, body) = get(
        seeded_router().await,
        "/trading/dynamics?oil_id=A100&start_date=2024-08-07&end_date=2024-08-08",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["date"].as_str().expect("date").to_string())
        .collect();
    assert_eq!(dates, vec!["2024-08-08", "2024-08-07"]);
}

#[tokio::test]
async fn dynamics_rejects_malformed_dates_and_inverted_ranges() {
    let (status, body) = get(seeded_router().await, "/trading/dynamics?start_date=08/07/2024").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_input");

    let (status, _) = get(
        seeded_router().await,
        "/trading/dynamics?start_date=2024-08-09&end_date=2024-08-07",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn storage_timeout_is_service_unavailable() {
    let repo = Arc::new(FailingRepo { timeout: true });
    let (status, body) = get(
        router_with(repo.clone(), repo),
        "/trading/last_trading_dates",
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "db_timeout");
}

#[tokio::test]
async fn health_reports_storage_state() {
    let (status, _) = get(seeded_router().await, "/health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let failing = Arc::new(FailingRepo { timeout: false });
    let healthy = InMemoryTradingRepo::seeded(Vec::new()).await;
    let (status, _) = get(router_with(healthy, failing), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
