//! Router-level tests: the full HTTP surface against the in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use topup_core::attestation::StaticAttestationVerifier;
use topup_core::catalog::StaticCatalog;
use topup_core::events::{OrderUpdatedReceiver, order_updated_channel};
use topup_core::flow::OrderFlow;
use topup_core::identity::{AuthMode, StaticIdentityVerifier};
use topup_core::store::MemoryOrderStore;

use crate::server::{build_router, cors_layer};
use crate::state::AppState;

const ATTEST: &str = "test-attest";

fn test_router(mode: AuthMode) -> (Router, OrderUpdatedReceiver) {
    let store = Arc::new(MemoryOrderStore::new());
    let (updates_tx, updates_rx) = order_updated_channel();
    let flow = Arc::new(OrderFlow::new(store, Arc::new(StaticCatalog), updates_tx));
    let identity = StaticIdentityVerifier::new()
        .with_identity("good-token", "user-1", true)
        .with_identity("unverified-token", "user-2", false);
    let state = AppState::new(
        flow,
        Arc::new(identity),
        Arc::new(StaticAttestationVerifier::new(ATTEST)),
        mode,
    );
    (build_router(state, cors_layer(&[])), updates_rx)
}

fn post(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("x-attestation-token", ATTEST)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_order(router: &Router) -> String {
    let (status, body) = send(
        router,
        post(
            "/createOrder",
            json!({"uid": "user-1", "productId": "cubacel-20", "destino": "53712345"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["orderId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_answers() {
    let (router, _rx) = test_router(AuthMode::Relaxed);
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn attestation_gate_runs_before_everything_else() {
    let (router, _rx) = test_router(AuthMode::Relaxed);

    // Missing header, body not even valid JSON: the gate answers first.
    let request = Request::builder()
        .method("POST")
        .uri("/createOrder")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_ATTESTATION");

    let request = Request::builder()
        .method("POST")
        .uri("/markOrderPaid")
        .header("content-type", "application/json")
        .header("x-attestation-token", "forged")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_ATTESTATION");
}

#[tokio::test]
async fn malformed_body_is_rejected_with_invalid_json_body() {
    let (router, _rx) = test_router(AuthMode::Relaxed);

    let request = Request::builder()
        .method("POST")
        .uri("/createOrder")
        .header("content-type", "application/json")
        .header("x-attestation-token", ATTEST)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_JSON_BODY");

    // Unknown fields are a schema violation, not silently dropped.
    let (status, body) = send(
        &router,
        post(
            "/createOrder",
            json!({"uid": "u", "productId": "cubacel-20", "destino": "53712345", "amount": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_JSON_BODY");
}

#[tokio::test]
async fn create_order_returns_server_priced_pending_order() {
    let (router, _rx) = test_router(AuthMode::Relaxed);

    let (status, body) = send(
        &router,
        post(
            "/createOrder",
            json!({"uid": "user-1", "productId": "Cubacel-20 ", "destino": "+53 5371 2345"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["amount"], "20.84");
    assert_eq!(body["currency"], "EUR");
    assert!(body["orderId"].is_string());
}

#[tokio::test]
async fn create_order_validation_errors() {
    let (router, _rx) = test_router(AuthMode::Relaxed);

    let cases = [
        (json!({"uid": "u", "productId": "cubacel-99", "destino": "53712345"}), "UNKNOWN_PRODUCT_ID"),
        (json!({"uid": "u", "productId": "", "destino": "53712345"}), "INVALID_PRODUCT_ID"),
        (json!({"uid": "u", "productId": "cubacel-20", "destino": "12345"}), "INVALID_CUBACEL_NUMBER"),
        (json!({"uid": "u", "productId": "nauta-10", "destino": "ana@gmail.com"}), "INVALID_NAUTA_EMAIL"),
        (json!({"uid": "u", "productId": "cubacel-20", "destino": ""}), "INVALID_DESTINO"),
        (json!({"uid": "", "productId": "cubacel-20", "destino": "53712345"}), "INVALID_UID"),
    ];
    for (request_body, expected) in cases {
        let (status, body) = send(&router, post("/createOrder", request_body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{request_body}");
        assert_eq!(body["error"], expected, "{request_body}");
    }
}

#[tokio::test]
async fn mark_paid_succeeds_then_replays_idempotently() {
    let (router, _rx) = test_router(AuthMode::Relaxed);
    let order_id = create_order(&router).await;

    let (status, body) = send(
        &router,
        post("/markOrderPaid", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PAID");
    assert!(body.get("alreadyPaid").is_none());

    let (status, body) = send(
        &router,
        post("/markOrderPaid", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alreadyPaid"], true);
}

#[tokio::test]
async fn foreign_uid_is_forbidden() {
    let (router, _rx) = test_router(AuthMode::Relaxed);
    let order_id = create_order(&router).await;

    let (status, body) = send(
        &router,
        post("/markOrderPaid", json!({"uid": "intruder", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn unknown_and_invalid_order_ids() {
    let (router, _rx) = test_router(AuthMode::Relaxed);

    let (status, body) = send(
        &router,
        post(
            "/markOrderPaid",
            json!({"uid": "user-1", "orderId": "1f0e7a0a-3b7b-4b1e-9c9d-111111111111"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ORDER_NOT_FOUND");

    let (status, body) = send(
        &router,
        post("/markOrderPaid", json!({"uid": "user-1", "orderId": "not-a-uuid"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ORDER_ID");
}

#[tokio::test]
async fn refund_on_pending_conflicts_and_cancel_is_terminal() {
    let (router, _rx) = test_router(AuthMode::Relaxed);
    let order_id = create_order(&router).await;

    let (status, body) = send(
        &router,
        post("/markOrderRefunded", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_STATUS");

    let (status, _) = send(
        &router,
        post("/markOrderCancelled", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A cancelled order can never be refunded, but that is not an error.
    let (status, body) = send(
        &router,
        post("/markOrderRefunded", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["terminalState"], true);
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn refund_after_payment_reports_fulfillment_sync() {
    let (router, _rx) = test_router(AuthMode::Relaxed);
    let order_id = create_order(&router).await;
    send(
        &router,
        post("/markOrderPaid", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;

    let (status, body) = send(
        &router,
        post("/markOrderRefunded", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REFUNDED");
    assert_eq!(body["recargaSynced"], true);

    let (status, body) = send(
        &router,
        post("/markOrderRefunded", json!({"uid": "user-1", "orderId": &order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alreadyRefunded"], true);
    assert_eq!(body["recargaSynced"], true);
}

#[tokio::test]
async fn strict_mode_demands_a_verified_bearer() {
    let (router, _rx) = test_router(AuthMode::Strict);

    // No credential at all.
    let (status, body) = send(
        &router,
        post(
            "/createOrder",
            json!({"uid": "user-1", "productId": "cubacel-20", "destino": "53712345"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_AUTH");

    // A rejected credential.
    let mut request = post(
        "/createOrder",
        json!({"productId": "cubacel-20", "destino": "53712345"}),
    );
    request
        .headers_mut()
        .insert("authorization", "Bearer forged".parse().unwrap());
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_ID_TOKEN");

    // A good credential: uid comes from the token, not the body.
    let mut request = post(
        "/createOrder",
        json!({"productId": "cubacel-20", "destino": "53712345"}),
    );
    request
        .headers_mut()
        .insert("authorization", "Bearer good-token".parse().unwrap());
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn strict_mode_blocks_unverified_emails_from_creating() {
    let (router, _rx) = test_router(AuthMode::Strict);

    let mut request = post(
        "/createOrder",
        json!({"productId": "cubacel-20", "destino": "53712345"}),
    );
    request
        .headers_mut()
        .insert("authorization", "Bearer unverified-token".parse().unwrap());
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "EMAIL_NOT_VERIFIED");
}
