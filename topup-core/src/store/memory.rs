//! In-memory order store.
//!
//! Backs the test suite and local runs without a database. A single mutex
//! around the whole map gives the same atomicity the Postgres
//! implementation gets from row locks: the decision function runs against
//! the state it will mutate.

use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    FulfillmentAction, OrderStore, StoreError, TransitionDecision, TransitionFn,
    TransitionOutcome, apply_status,
};
use crate::entities::{Fulfillment, FulfillmentStatus, NewOrder, Order, OrderEvent, OrderStatus};

#[derive(Debug)]
struct OrderSlot {
    order: Order,
    events: Vec<OrderEvent>,
    fulfillment: Option<Fulfillment>,
}

#[derive(Debug, Default)]
struct Inner {
    orders: HashMap<Uuid, OrderSlot>,
    next_event_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    inner: Mutex<Inner>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, StoreError> {
        let order = Order {
            order_id: Uuid::new_v4(),
            uid: new_order.uid,
            product_id: new_order.product_id,
            destination: new_order.destination,
            amount: new_order.amount,
            currency: new_order.currency,
            channel: new_order.channel,
            status: OrderStatus::Pending,
            auth_source: new_order.auth_source,
            created_at: OffsetDateTime::now_utc(),
            paid_at: None,
            failed_at: None,
            cancelled_at: None,
            refunded_at: None,
            fulfilled_at: None,
            recarga_synced_at: None,
        };
        let mut inner = self.inner.lock().await;
        inner.orders.insert(
            order.order_id,
            OrderSlot {
                order: order.clone(),
                events: Vec::new(),
                fulfillment: None,
            },
        );
        Ok(order)
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.orders.get(&order_id).map(|slot| slot.order.clone()))
    }

    async fn run_transition(
        &self,
        order_id: Uuid,
        decide: &TransitionFn,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        let next_event_id = inner.next_event_id;
        let Some(slot) = inner.orders.get_mut(&order_id) else {
            return Ok(TransitionOutcome::NotFound);
        };

        match decide(&slot.order) {
            TransitionDecision::Reject => Ok(TransitionOutcome::Rejected {
                order: slot.order.clone(),
            }),
            TransitionDecision::Noop { reason, fulfillment } => {
                let fulfillment_synced = match fulfillment {
                    Some(action) => {
                        upsert_fulfillment(slot, action);
                        true
                    }
                    None => false,
                };
                Ok(TransitionOutcome::Noop {
                    order: slot.order.clone(),
                    reason,
                    fulfillment_synced,
                })
            }
            TransitionDecision::Execute(step) => {
                let now = OffsetDateTime::now_utc();
                let status_from = slot.order.status;

                slot.events.push(OrderEvent {
                    id: next_event_id,
                    order_id,
                    event_type: step.event,
                    status_from,
                    status_to: step.to,
                    uid: slot.order.uid.clone(),
                    channel: slot.order.channel,
                    auth_source: slot.order.auth_source,
                    created_at: now,
                });
                apply_status(&mut slot.order, step.to, now);
                if let Some(action) = step.fulfillment {
                    upsert_fulfillment(slot, action);
                }

                let order = slot.order.clone();
                inner.next_event_id += 1;
                Ok(TransitionOutcome::Executed { order, status_from })
            }
        }
    }

    async fn get_fulfillment(&self, order_id: Uuid) -> Result<Option<Fulfillment>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .orders
            .get(&order_id)
            .and_then(|slot| slot.fulfillment.clone()))
    }

    async fn list_events(&self, order_id: Uuid) -> Result<Vec<OrderEvent>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .orders
            .get(&order_id)
            .map(|slot| slot.events.clone())
            .unwrap_or_default())
    }
}

fn upsert_fulfillment(slot: &mut OrderSlot, action: FulfillmentAction) {
    let status = match action {
        FulfillmentAction::Complete => FulfillmentStatus::Completed,
        FulfillmentAction::Refund => FulfillmentStatus::Refunded,
    };
    let now = OffsetDateTime::now_utc();
    match slot.fulfillment.as_mut() {
        Some(record) => {
            record.status = status;
            record.updated_at = now;
        }
        None => {
            slot.fulfillment = Some(Fulfillment {
                order_id: slot.order.order_id,
                product_id: slot.order.product_id.clone(),
                destination: slot.order.destination.clone(),
                amount: slot.order.amount,
                currency: slot.order.currency.clone(),
                status,
                created_at: now,
                updated_at: now,
            });
        }
    }
}
