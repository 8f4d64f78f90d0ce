use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use super::AuthSource;

/// Order status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `topup_sdk::objects::OrderStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "order_status")]
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
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Failed => write!(f, "failed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// The operating channel an order was created under.
///
/// Only `sandbox` orders accept manual status transitions and trigger
/// fulfillment; `live` is reserved for a future gateway integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "order_channel")]
pub enum OrderChannel {
    Sandbox,
    Live,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Order {
    pub order_id: Uuid,
    pub uid: String,
    pub product_id: String,
    pub destination: String,
    pub amount: Decimal,
    pub currency: String,
    pub channel: OrderChannel,
    pub status: OrderStatus,
    pub auth_source: AuthSource,
    pub created_at: OffsetDateTime,
    pub paid_at: Option<OffsetDateTime>,
    pub failed_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub refunded_at: Option<OffsetDateTime>,
    pub fulfilled_at: Option<OffsetDateTime>,
    /// Idempotency marker for the fulfillment synchronizer. Set exactly
    /// once, in the same transaction that records the fulfillment.
    pub recarga_synced_at: Option<OffsetDateTime>,
}

/// The fields of an order the create operation supplies; everything else
/// is stamped by the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub uid: String,
    pub product_id: String,
    pub destination: String,
    pub amount: Decimal,
    pub currency: String,
    pub channel: OrderChannel,
    pub auth_source: AuthSource,
}

/// Audit event type. Mirrors the transition that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "order_event_type")]
pub enum OrderEventType {
    /// Manual sandbox payment confirmation (no real gateway behind it).
    PaidStub,
    Failed,
    Cancelled,
    Refunded,
    Completed,
}

/// Append-only audit record, child of an order.
///
/// Written in the same transaction as the status change it describes;
/// idempotent no-op requests never produce one.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderEvent {
    pub id: i64,
    pub order_id: Uuid,
    pub event_type: OrderEventType,
    pub status_from: OrderStatus,
    pub status_to: OrderStatus,
    pub uid: String,
    pub channel: OrderChannel,
    pub auth_source: AuthSource,
    pub created_at: OffsetDateTime,
}
