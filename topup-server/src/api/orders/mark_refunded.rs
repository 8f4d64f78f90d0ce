use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use topup_core::flow::MarkOutcome;
use topup_sdk::objects::MarkOrderRequest;

use super::{ApiError, mark_response, parse_order_id, resolve_caller};
use crate::api::extractors::Attested;
use crate::state::AppState;

/// `POST /markOrderRefunded` — refund a paid or completed order.
///
/// The fulfillment record is flipped to REFUNDED in the same transaction
/// as the order. An idempotent replay re-syncs the record defensively and
/// reports it through `recargaSynced`.
pub(super) async fn mark_order_refunded(
    State(state): State<AppState>,
    _attested: Attested,
    headers: HeaderMap,
    body: Result<Json<MarkOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::InvalidJsonBody)?;
    let caller = resolve_caller(&state, &headers, body.uid.as_deref()).await?;
    let order_id = parse_order_id(body.order_id.as_deref())?;

    let response = match state.flow.mark_refunded(&caller.uid, order_id).await? {
        MarkOutcome::Executed { order } => {
            let mut response = mark_response(&order);
            response.recarga_synced = Some(true);
            response
        }
        MarkOutcome::AlreadyInTarget {
            order,
            fulfillment_synced,
        } => {
            let mut response = mark_response(&order);
            response.already_refunded = Some(true);
            response.recarga_synced = Some(fulfillment_synced);
            response
        }
        MarkOutcome::Terminal { order } => {
            let mut response = mark_response(&order);
            response.terminal_state = Some(true);
            response
        }
    };
    Ok(Json(response))
}
