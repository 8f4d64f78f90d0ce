use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// Fulfillment status.
///
/// A record is created as `Completed` by the fulfillment synchronizer and
/// flipped to `Refunded` by the refund transition. There is no pending
/// state: the record only exists once delivery has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "fulfillment_status")]
pub enum FulfillmentStatus {
    Completed,
    Refunded,
}

/// The derived delivery record, keyed 1:1 by the originating order.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Fulfillment {
    pub order_id: Uuid,
    pub product_id: String,
    pub destination: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: FulfillmentStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
