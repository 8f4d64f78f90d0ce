use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use topup_core::identity::require_verified_email;
use topup_sdk::objects::{CreateOrderRequest, CreateOrderResponse, OrderStatus as SdkOrderStatus};

use super::{ApiError, resolve_caller};
use crate::api::extractors::Attested;
use crate::state::AppState;

/// `POST /createOrder` — validate server-side, price from the catalog,
/// persist a PENDING order.
///
/// The response carries the server-computed amount; any price-like field
/// a client might send is rejected by the strict request schema.
pub(super) async fn create_order(
    State(state): State<AppState>,
    _attested: Attested,
    headers: HeaderMap,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::InvalidJsonBody)?;

    let caller = resolve_caller(&state, &headers, body.uid.as_deref()).await?;
    require_verified_email(state.auth_mode, &caller)?;

    let order = state
        .flow
        .create_order(&caller, body.product_id.as_deref(), body.destino.as_deref())
        .await?;

    Ok(Json(CreateOrderResponse {
        ok: true,
        order_id: order.order_id,
        amount: order.amount,
        currency: order.currency.clone(),
        status: SdkOrderStatus::from(order.status),
    }))
}
