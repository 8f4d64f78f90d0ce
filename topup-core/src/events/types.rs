use uuid::Uuid;

use crate::entities::{OrderChannel, OrderStatus};

/// Notification that an order's status changed: a before/after snapshot
/// pair plus routing context. Consumers re-fetch the order before acting;
/// the snapshot only selects which edges to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdated {
    pub order_id: Uuid,
    pub status_from: OrderStatus,
    pub status_to: OrderStatus,
    pub channel: OrderChannel,
}
