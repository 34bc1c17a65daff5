//! Reconciliation trigger endpoint tests.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::*;
use serde_json::json;
use tessera_core::TenantId;
use tower::ServiceExt;

fn run_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/reconciliation/run")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn run_fills_gaps_and_returns_report() {
    let tenant = TenantId::new();
    let product = clip_card_product(tenant);

    // Two completed purchases in the last week, neither provisioned yet.
    let mut tx_a = pass_purchase("tx_a", tenant, product.id);
    tx_a.completed_at = Utc::now() - Duration::days(1);
    let mut tx_b = pass_purchase("tx_b", tenant, product.id);
    tx_b.completed_at = Utc::now() - Duration::days(2);
    tx_b.metadata.user_ref = Some("ext-user-2".to_string());

    let store = Arc::new(TestStore::default());
    store.products.lock().unwrap().push(product);
    let ledger = Arc::new(TestLedger {
        transactions: vec![tx_a, tx_b],
    });
    let router = test_router(store.clone(), ledger);

    let response = router
        .clone()
        .oneshot(run_request(json!({"window_days": 7})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["examined"], 2);
    assert_eq!(report["created"], 2);
    assert_eq!(report["failures"].as_array().unwrap().len(), 0);
    assert_eq!(store.entitlement_count(), 2);

    // Idempotent: a second run creates nothing.
    let response = router
        .oneshot(run_request(json!({"window_days": 7})))
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["created"], 0);
    assert_eq!(report["already_provisioned"], 2);
    assert_eq!(store.entitlement_count(), 2);
}

#[tokio::test]
async fn run_with_invalid_window_is_rejected() {
    let router = test_router(Arc::new(TestStore::default()), Arc::new(TestLedger::default()));

    let response = router
        .oneshot(run_request(json!({"window_days": 0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn run_without_window_uses_default() {
    let router = test_router(Arc::new(TestStore::default()), Arc::new(TestLedger::default()));

    let response = router.oneshot(run_request(json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
