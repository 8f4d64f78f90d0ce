pub mod fulfillment;
pub mod order;

use topup_sdk::objects::{AuthSource as SdkAuthSource, OrderStatus as SdkOrderStatus};

pub use fulfillment::{Fulfillment, FulfillmentStatus};
pub use order::{NewOrder, Order, OrderChannel, OrderEvent, OrderEventType, OrderStatus};

/// Auth source for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `topup_sdk::objects::AuthSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "auth_source")]
pub enum AuthSource {
    Token,
    Body,
}

impl From<AuthSource> for SdkAuthSource {
    fn from(value: AuthSource) -> Self {
        match value {
            AuthSource::Token => SdkAuthSource::Token,
            AuthSource::Body => SdkAuthSource::Body,
        }
    }
}

impl From<SdkAuthSource> for AuthSource {
    fn from(value: SdkAuthSource) -> Self {
        match value {
            SdkAuthSource::Token => AuthSource::Token,
            SdkAuthSource::Body => AuthSource::Body,
        }
    }
}

impl From<OrderStatus> for SdkOrderStatus {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => SdkOrderStatus::Pending,
            OrderStatus::Paid => SdkOrderStatus::Paid,
            OrderStatus::Completed => SdkOrderStatus::Completed,
            OrderStatus::Failed => SdkOrderStatus::Failed,
            OrderStatus::Cancelled => SdkOrderStatus::Cancelled,
            OrderStatus::Refunded => SdkOrderStatus::Refunded,
        }
    }
}

impl From<SdkOrderStatus> for OrderStatus {
    fn from(value: SdkOrderStatus) -> Self {
        match value {
            SdkOrderStatus::Pending => OrderStatus::Pending,
            SdkOrderStatus::Paid => OrderStatus::Paid,
            SdkOrderStatus::Completed => OrderStatus::Completed,
            SdkOrderStatus::Failed => OrderStatus::Failed,
            SdkOrderStatus::Cancelled => OrderStatus::Cancelled,
            SdkOrderStatus::Refunded => OrderStatus::Refunded,
        }
    }
}
