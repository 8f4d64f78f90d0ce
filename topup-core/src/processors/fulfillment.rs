//! FulfillmentSynchronizer processor.
//!
//! The FulfillmentSynchronizer is responsible for:
//! - Receiving `OrderUpdated` events
//! - Selecting the sandbox `PENDING -> PAID` edge
//! - Recording the fulfillment and advancing the order to `COMPLETED`
//!   in one guarded transaction
//!
//! Delivery is at-least-once, so the guard inside the transaction (status
//! still `PAID`, sync marker unset) carries the idempotency: a redelivered
//! or stale event lands in the no-op branch.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::entities::{OrderChannel, OrderStatus};
use crate::events::{OrderUpdated, OrderUpdatedReceiver};
use crate::machine;
use crate::store::{OrderStore, StoreError, TransitionOutcome};

pub struct FulfillmentSynchronizer {
    store: Arc<dyn OrderStore>,
    updates_rx: OrderUpdatedReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl FulfillmentSynchronizer {
    /// Create a new FulfillmentSynchronizer.
    ///
    /// # Arguments
    ///
    /// * `store` - Order store
    /// * `updates_rx` - Receiver for OrderUpdated events
    /// * `shutdown_rx` - Receiver for shutdown signal
    pub fn new(
        store: Arc<dyn OrderStore>,
        updates_rx: OrderUpdatedReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            updates_rx,
            shutdown_rx,
        }
    }

    /// Run the FulfillmentSynchronizer.
    pub async fn run(mut self) {
        info!("FulfillmentSynchronizer started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    // A closed shutdown channel means the supervisor is
                    // gone; treat it the same as an explicit signal.
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("FulfillmentSynchronizer received shutdown signal");
                        break;
                    }
                }

                Some(update) = self.updates_rx.recv() => {
                    debug!(
                        order_id = %update.order_id,
                        from = %update.status_from,
                        to = %update.status_to,
                        "Received OrderUpdated"
                    );

                    if let Err(e) = self.process_update(&update).await {
                        error!(
                            order_id = %update.order_id,
                            error = %e,
                            "Failed to process OrderUpdated"
                        );
                    }
                }

                else => {
                    info!("OrderUpdated channel closed");
                    break;
                }
            }
        }

        info!("FulfillmentSynchronizer shutdown complete");
    }

    /// Process one OrderUpdated event.
    async fn process_update(&self, update: &OrderUpdated) -> Result<(), StoreError> {
        let fires = update.channel == OrderChannel::Sandbox
            && update.status_from == OrderStatus::Pending
            && update.status_to == OrderStatus::Paid;
        if !fires {
            return Ok(());
        }

        match self
            .store
            .run_transition(update.order_id, &machine::decide_fulfillment)
            .await?
        {
            TransitionOutcome::Executed { order, .. } => {
                info!(
                    order_id = %order.order_id,
                    destination = %order.destination,
                    amount = %order.amount,
                    "fulfillment recorded, order completed"
                );
            }
            TransitionOutcome::Noop { .. } => {
                debug!(order_id = %update.order_id, "order already fulfilled, skipping");
            }
            TransitionOutcome::Rejected { order } => {
                warn!(
                    order_id = %order.order_id,
                    status = %order.status,
                    "order no longer eligible for fulfillment"
                );
            }
            TransitionOutcome::NotFound => {
                warn!(order_id = %update.order_id, "order not found for fulfillment");
            }
        }
        Ok(())
    }
}
