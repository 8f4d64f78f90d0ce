//! The order flow: validation, guards, and guarded transitions.
//!
//! This is the single write path to the order store. Entry-point handlers
//! translate HTTP requests into these calls and [`FlowError`] values back
//! into responses; nothing here knows about HTTP.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{CatalogError, ProductResolver};
use crate::destino::{DestinoError, validate_destino};
use crate::entities::{NewOrder, Order, OrderChannel, OrderStatus};
use crate::events::{OrderUpdated, OrderUpdatedSender};
use crate::identity::{MAX_UID_LEN, ResolvedIdentity};
use crate::machine;
use crate::store::{NoopReason, OrderStore, StoreError, TransitionFn, TransitionOutcome};

/// Upper bound on a product id.
pub const MAX_PRODUCT_ID_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("uid is empty or exceeds {MAX_UID_LEN} characters")]
    InvalidUid,
    #[error("product id is empty or exceeds {MAX_PRODUCT_ID_LEN} characters")]
    InvalidProductId,
    #[error("unknown product id")]
    UnknownProductId,
    #[error("product is not published")]
    ProductNotPublished,
    #[error(transparent)]
    Destino(#[from] DestinoError),
    #[error("computed amount is not positive")]
    InvalidProductAmount,
    #[error("order not found")]
    OrderNotFound,
    #[error("order channel does not accept manual transitions")]
    NotAllowedChannel,
    #[error("caller does not own this order")]
    Forbidden,
    #[error("transition is illegal from status {status}")]
    InvalidStatus { status: OrderStatus },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CatalogError> for FlowError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unknown => FlowError::UnknownProductId,
            CatalogError::NotPublished => FlowError::ProductNotPublished,
            CatalogError::Store(e) => FlowError::Store(e),
        }
    }
}

/// Outcome of a mark-* operation that did not fail.
#[derive(Debug, Clone)]
pub enum MarkOutcome {
    /// The transition actually ran.
    Executed { order: Order },
    /// The order was already in the target state.
    AlreadyInTarget {
        order: Order,
        /// Whether a defensive fulfillment re-sync was applied.
        fulfillment_synced: bool,
    },
    /// A terminal state supersedes the request.
    Terminal { order: Order },
}

pub struct OrderFlow {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductResolver>,
    updates: OrderUpdatedSender,
}

impl OrderFlow {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductResolver>,
        updates: OrderUpdatedSender,
    ) -> Self {
        Self {
            store,
            catalog,
            updates,
        }
    }

    /// Create a new PENDING order. The amount is always recomputed from
    /// the catalog; nothing price-like is accepted from the caller.
    pub async fn create_order(
        &self,
        identity: &ResolvedIdentity,
        product_id: Option<&str>,
        destino: Option<&str>,
    ) -> Result<Order, FlowError> {
        let uid = identity.uid.as_str();
        if uid.is_empty() || uid.chars().count() > MAX_UID_LEN {
            return Err(FlowError::InvalidUid);
        }

        let product_id = product_id.unwrap_or_default().trim().to_lowercase();
        if product_id.is_empty() || product_id.chars().count() > MAX_PRODUCT_ID_LEN {
            return Err(FlowError::InvalidProductId);
        }

        let product = self.catalog.resolve(&product_id).await?;
        let destination = validate_destino(product.kind, destino.unwrap_or_default())?;

        if product.amount <= Decimal::ZERO {
            return Err(FlowError::InvalidProductAmount);
        }

        let order = self
            .store
            .insert_order(NewOrder {
                uid: uid.to_string(),
                product_id: product.product_id,
                destination,
                amount: product.amount,
                currency: product.currency,
                channel: OrderChannel::Sandbox,
                auth_source: identity.source,
            })
            .await?;

        tracing::info!(
            order_id = %order.order_id,
            uid = %order.uid,
            product_id = %order.product_id,
            auth_source = ?order.auth_source,
            "order created"
        );
        Ok(order)
    }

    pub async fn mark_paid(&self, caller_uid: &str, order_id: Uuid) -> Result<MarkOutcome, FlowError> {
        self.transition(caller_uid, order_id, &machine::decide_mark_paid).await
    }

    pub async fn mark_failed(&self, caller_uid: &str, order_id: Uuid) -> Result<MarkOutcome, FlowError> {
        self.transition(caller_uid, order_id, &machine::decide_mark_failed).await
    }

    pub async fn mark_cancelled(&self, caller_uid: &str, order_id: Uuid) -> Result<MarkOutcome, FlowError> {
        self.transition(caller_uid, order_id, &machine::decide_mark_cancelled).await
    }

    pub async fn mark_refunded(&self, caller_uid: &str, order_id: Uuid) -> Result<MarkOutcome, FlowError> {
        self.transition(caller_uid, order_id, &machine::decide_mark_refunded).await
    }

    /// Shared mark-* path: load, guard, transition, notify.
    ///
    /// Channel and ownership are checked against the pre-read — both
    /// fields are immutable after creation. The status decision is not:
    /// the store re-evaluates `decide` against its own fresh read.
    async fn transition(
        &self,
        caller_uid: &str,
        order_id: Uuid,
        decide: &TransitionFn,
    ) -> Result<MarkOutcome, FlowError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(FlowError::OrderNotFound)?;

        if order.channel != OrderChannel::Sandbox {
            return Err(FlowError::NotAllowedChannel);
        }
        if order.uid != caller_uid {
            return Err(FlowError::Forbidden);
        }

        match self.store.run_transition(order_id, decide).await? {
            TransitionOutcome::Executed { order, status_from } => {
                tracing::info!(
                    order_id = %order.order_id,
                    from = %status_from,
                    to = %order.status,
                    "order transition executed"
                );
                let update = OrderUpdated {
                    order_id: order.order_id,
                    status_from,
                    status_to: order.status,
                    channel: order.channel,
                };
                if let Err(e) = self.updates.send(update).await {
                    tracing::error!(order_id = %order.order_id, error = %e, "failed to emit OrderUpdated event");
                }
                Ok(MarkOutcome::Executed { order })
            }
            TransitionOutcome::Noop {
                order,
                reason: NoopReason::AlreadyInTarget,
                fulfillment_synced,
            } => Ok(MarkOutcome::AlreadyInTarget {
                order,
                fulfillment_synced,
            }),
            TransitionOutcome::Noop {
                order,
                reason: NoopReason::Terminal,
                ..
            } => Ok(MarkOutcome::Terminal { order }),
            TransitionOutcome::Rejected { order } => Err(FlowError::InvalidStatus {
                status: order.status,
            }),
            TransitionOutcome::NotFound => Err(FlowError::OrderNotFound),
        }
    }
}
