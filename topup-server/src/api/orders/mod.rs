//! Order API handlers.
//!
//! One module per entry point, mirroring the original function-per-route
//! deployment:
//!
//! - `POST /createOrder`         – validate, price, persist a PENDING order
//! - `POST /markOrderPaid`       – sandbox payment confirmation
//! - `POST /markOrderFailed`     – mark a pending order failed
//! - `POST /markOrderCancelled`  – mark a pending order cancelled
//! - `POST /markOrderRefunded`   – refund a paid/completed order
//!
//! All routes demand a valid attestation token and resolve the caller's
//! identity before touching the store.

use axum::Router;
use axum::http::{HeaderMap, header};
use axum::routing::post;
use uuid::Uuid;

use topup_core::identity::{self, ResolvedIdentity};
use topup_sdk::objects::{MarkOrderResponse, OrderStatus as SdkOrderStatus};

use super::ApiError;
use crate::state::AppState;

mod create_order;
mod mark_cancelled;
mod mark_failed;
mod mark_paid;
mod mark_refunded;

/// Build the order API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/createOrder", post(create_order::create_order))
        .route("/markOrderPaid", post(mark_paid::mark_order_paid))
        .route("/markOrderFailed", post(mark_failed::mark_order_failed))
        .route(
            "/markOrderCancelled",
            post(mark_cancelled::mark_order_cancelled),
        )
        .route(
            "/markOrderRefunded",
            post(mark_refunded::mark_order_refunded),
        )
}

/// Extract the bearer token from the `Authorization` header, scheme
/// case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, rest) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Resolve the caller: verified token first, body fallback only in
/// relaxed mode.
async fn resolve_caller(
    state: &AppState,
    headers: &HeaderMap,
    body_uid: Option<&str>,
) -> Result<ResolvedIdentity, ApiError> {
    let bearer = bearer_token(headers);
    let resolved = identity::resolve_identity(
        state.identity.as_ref(),
        state.auth_mode,
        bearer.as_deref(),
        body_uid,
    )
    .await?;
    Ok(resolved)
}

fn parse_order_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(ApiError::InvalidOrderId)
}

/// Convert an `Order` (store model) into the shared mark-* response
/// skeleton; each handler fills in its own flags.
fn mark_response(order: &topup_core::entities::Order) -> MarkOrderResponse {
    MarkOrderResponse::new(order.order_id, SdkOrderStatus::from(order.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("BEARER abc.def"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn non_bearer_and_empty_tokens_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.remove(header::AUTHORIZATION);
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn order_id_parsing() {
        assert!(parse_order_id(Some("not-a-uuid")).is_err());
        assert!(parse_order_id(Some("")).is_err());
        assert!(parse_order_id(None).is_err());
        assert!(parse_order_id(Some("1f0e7a0a-3b7b-4b1e-9c9d-111111111111")).is_ok());
    }
}
