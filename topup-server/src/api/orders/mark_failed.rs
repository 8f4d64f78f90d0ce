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

/// `POST /markOrderFailed` — mark a pending order failed.
///
/// Failing an order that is already paid or completed is meaningless,
/// not an error: those answer success with `terminalState` and stay
/// untouched.
pub(super) async fn mark_order_failed(
    State(state): State<AppState>,
    _attested: Attested,
    headers: HeaderMap,
    body: Result<Json<MarkOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::InvalidJsonBody)?;
    let caller = resolve_caller(&state, &headers, body.uid.as_deref()).await?;
    let order_id = parse_order_id(body.order_id.as_deref())?;

    let response = match state.flow.mark_failed(&caller.uid, order_id).await? {
        MarkOutcome::Executed { order } => mark_response(&order),
        MarkOutcome::AlreadyInTarget { order, .. } => {
            let mut response = mark_response(&order);
            response.already_failed = Some(true);
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
