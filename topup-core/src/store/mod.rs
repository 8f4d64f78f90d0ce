//! The order store.
//!
//! [`OrderStore`] is the only gateway to order mutation: every status
//! change goes through [`OrderStore::run_transition`], which re-reads the
//! order inside the storage transaction and re-evaluates the caller's
//! decision function against that fresh row. Two racing callers therefore
//! cannot both execute conflicting transitions; the loser observes the
//! committed state and lands in the no-op or reject branch.

pub mod memory;
pub mod pg;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::{Fulfillment, NewOrder, Order, OrderEvent, OrderEventType, OrderStatus};

pub use memory::MemoryOrderStore;
pub use pg::PgOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Why a transition request turned into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    /// The order is already in the requested target state.
    AlreadyInTarget,
    /// The order is in a terminal state that supersedes the request.
    Terminal,
}

/// Side effect on the fulfillment record, applied in the same transaction
/// as the order mutation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentAction {
    /// Upsert the record with status `completed` (delivery recorded).
    Complete,
    /// Upsert the record with status `refunded`.
    Refund,
}

/// An executed transition: target status, the audit event recording it,
/// and an optional fulfillment side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStep {
    pub to: OrderStatus,
    pub event: OrderEventType,
    pub fulfillment: Option<FulfillmentAction>,
}

/// What to do with an order, decided against the in-transaction read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    Execute(TransitionStep),
    /// Return success without mutating the order. A fulfillment action may
    /// still run (defensive re-sync on idempotent refund replays).
    Noop {
        reason: NoopReason,
        fulfillment: Option<FulfillmentAction>,
    },
    /// Illegal transition attempt; nothing is written.
    Reject,
}

/// Result of [`OrderStore::run_transition`].
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Executed {
        order: Order,
        status_from: OrderStatus,
    },
    Noop {
        order: Order,
        reason: NoopReason,
        fulfillment_synced: bool,
    },
    Rejected {
        order: Order,
    },
    NotFound,
}

/// Decision function re-evaluated by the store against the fresh
/// in-transaction read.
pub type TransitionFn = dyn Fn(&Order) -> TransitionDecision + Send + Sync;

#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order in `PENDING` state and return it.
    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, StoreError>;

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Atomically read the order, evaluate `decide`, and apply the
    /// resulting decision. The status update, its audit event, and any
    /// fulfillment action commit together or not at all.
    async fn run_transition(
        &self,
        order_id: Uuid,
        decide: &TransitionFn,
    ) -> Result<TransitionOutcome, StoreError>;

    async fn get_fulfillment(&self, order_id: Uuid) -> Result<Option<Fulfillment>, StoreError>;

    /// Audit events for an order, oldest first.
    async fn list_events(&self, order_id: Uuid) -> Result<Vec<OrderEvent>, StoreError>;
}

/// Mirror a status change onto the order struct, stamping the timestamp
/// that belongs to the target status. `Completed` also stamps the
/// fulfillment idempotency marker.
pub(crate) fn apply_status(order: &mut Order, to: OrderStatus, now: OffsetDateTime) {
    order.status = to;
    match to {
        OrderStatus::Paid => order.paid_at = Some(now),
        OrderStatus::Failed => order.failed_at = Some(now),
        OrderStatus::Cancelled => order.cancelled_at = Some(now),
        OrderStatus::Refunded => order.refunded_at = Some(now),
        OrderStatus::Completed => {
            order.fulfilled_at = Some(now);
            order.recarga_synced_at = Some(now);
        }
        OrderStatus::Pending => {}
    }
}
