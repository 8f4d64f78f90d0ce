//! Order API request and response types.
//!
//! Request bodies are strict: unknown or mistyped fields are rejected at
//! deserialization time, before any business logic runs. Fields the
//! original clients were allowed to omit (`uid` in relaxed auth mode) stay
//! optional here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ErrorCode;

/// Order status for API responses.
///
/// This is the API/DTO version without sqlx::Type. For database
/// operations, use the version in `topup-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Failed => write!(f, "FAILED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// How the caller's identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    /// A verified bearer credential.
    Token,
    /// The `uid` field of the request body (relaxed mode only).
    Body,
}

/// Request body for `POST /createOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Fallback subject id, honored only when no bearer credential is
    /// present and the server runs in relaxed auth mode.
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub destino: Option<String>,
}

/// Response body for a successful `POST /createOrder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub ok: bool,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
}

/// Request body shared by the four `POST /markOrder*` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkOrderRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Response body shared by the four `POST /markOrder*` endpoints.
///
/// Exactly one of the `already*` flags can appear, and only on idempotent
/// replays; `terminal_state` marks requests superseded by a terminal
/// status; `recarga_synced` reports that the fulfillment record mirrors a
/// refund. Absent flags are omitted from the JSON entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkOrderResponse {
    pub ok: bool,
    pub order_id: Uuid,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_cancelled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_refunded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_state: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recarga_synced: Option<bool>,
}

impl MarkOrderResponse {
    pub fn new(order_id: Uuid, status: OrderStatus) -> Self {
        Self {
            ok: true,
            order_id,
            status,
            already_paid: None,
            already_failed: None,
            already_cancelled: None,
            already_refunded: None,
            terminal_state: None,
            recarga_synced: None,
        }
    }
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: ErrorCode,
}

impl ErrorBody {
    pub fn new(error: ErrorCode) -> Self {
        Self { ok: false, error }
    }
}
