//! Postgres-backed order store.
//!
//! `run_transition` takes a row lock (`SELECT … FOR UPDATE`) before
//! evaluating the decision function, so the status it decides on is the
//! status that gets overwritten.

use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    FulfillmentAction, OrderStore, StoreError, TransitionDecision, TransitionFn,
    TransitionOutcome, apply_status,
};
use crate::entities::{
    Fulfillment, FulfillmentStatus, NewOrder, Order, OrderEvent, OrderEventType, OrderStatus,
};

const SELECT_ORDER: &str = r#"
    SELECT order_id, uid, product_id, destination, amount, currency, channel, status,
           auth_source, created_at, paid_at, failed_at, cancelled_at, refunded_at,
           fulfilled_at, recarga_synced_at
    FROM orders
    WHERE order_id = $1
"#;

#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OrderStore for PgOrderStore {
    async fn insert_order(&self, new_order: NewOrder) -> Result<Order, StoreError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (order_id, uid, product_id, destination, amount, currency, channel,
                 status, auth_source, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING order_id, uid, product_id, destination, amount, currency, channel,
                      status, auth_source, created_at, paid_at, failed_at, cancelled_at,
                      refunded_at, fulfilled_at, recarga_synced_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_order.uid)
        .bind(&new_order.product_id)
        .bind(&new_order.destination)
        .bind(new_order.amount)
        .bind(&new_order.currency)
        .bind(new_order.channel)
        .bind(OrderStatus::Pending)
        .bind(new_order.auth_source)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let order = sqlx::query_as::<_, Order>(SELECT_ORDER)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn run_transition(
        &self,
        order_id: Uuid,
        decide: &TransitionFn,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} FOR UPDATE"))
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(order) = order else {
            return Ok(TransitionOutcome::NotFound);
        };

        match decide(&order) {
            TransitionDecision::Reject => Ok(TransitionOutcome::Rejected { order }),
            TransitionDecision::Noop { reason, fulfillment } => {
                let fulfillment_synced = match fulfillment {
                    Some(action) => {
                        upsert_fulfillment(&mut tx, &order, action).await?;
                        tx.commit().await?;
                        true
                    }
                    None => false,
                };
                Ok(TransitionOutcome::Noop {
                    order,
                    reason,
                    fulfillment_synced,
                })
            }
            TransitionDecision::Execute(step) => {
                let now = OffsetDateTime::now_utc();
                let status_from = order.status;

                update_status(&mut tx, order_id, step.to, now).await?;
                append_event(&mut tx, &order, step.event, step.to, now).await?;
                if let Some(action) = step.fulfillment {
                    upsert_fulfillment(&mut tx, &order, action).await?;
                }
                tx.commit().await?;

                let mut updated = order;
                apply_status(&mut updated, step.to, now);
                Ok(TransitionOutcome::Executed {
                    order: updated,
                    status_from,
                })
            }
        }
    }

    async fn get_fulfillment(&self, order_id: Uuid) -> Result<Option<Fulfillment>, StoreError> {
        let record = sqlx::query_as::<_, Fulfillment>(
            r#"
            SELECT order_id, product_id, destination, amount, currency, status,
                   created_at, updated_at
            FROM fulfillments
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_events(&self, order_id: Uuid) -> Result<Vec<OrderEvent>, StoreError> {
        let events = sqlx::query_as::<_, OrderEvent>(
            r#"
            SELECT id, order_id, event_type, status_from, status_to, uid, channel,
                   auth_source, created_at
            FROM order_events
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}

/// Single guarded UPDATE for the status column. The timestamp columns
/// follow the target status; untouched ones keep their value.
async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    to: OrderStatus,
    now: OffsetDateTime,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE orders SET
            status = $2,
            paid_at = CASE WHEN $2 = 'paid'::order_status THEN $3 ELSE paid_at END,
            failed_at = CASE WHEN $2 = 'failed'::order_status THEN $3 ELSE failed_at END,
            cancelled_at = CASE WHEN $2 = 'cancelled'::order_status THEN $3 ELSE cancelled_at END,
            refunded_at = CASE WHEN $2 = 'refunded'::order_status THEN $3 ELSE refunded_at END,
            fulfilled_at = CASE WHEN $2 = 'completed'::order_status THEN $3 ELSE fulfilled_at END,
            recarga_synced_at = CASE WHEN $2 = 'completed'::order_status THEN $3 ELSE recarga_synced_at END
        WHERE order_id = $1
        "#,
    )
    .bind(order_id)
    .bind(to)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn append_event(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
    event_type: OrderEventType,
    status_to: OrderStatus,
    now: OffsetDateTime,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO order_events
            (order_id, event_type, status_from, status_to, uid, channel, auth_source, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(order.order_id)
    .bind(event_type)
    .bind(order.status)
    .bind(status_to)
    .bind(&order.uid)
    .bind(order.channel)
    .bind(order.auth_source)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_fulfillment(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
    action: FulfillmentAction,
) -> Result<(), StoreError> {
    let status = match action {
        FulfillmentAction::Complete => FulfillmentStatus::Completed,
        FulfillmentAction::Refund => FulfillmentStatus::Refunded,
    };
    sqlx::query(
        r#"
        INSERT INTO fulfillments
            (order_id, product_id, destination, amount, currency, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (order_id)
        DO UPDATE SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(order.order_id)
    .bind(&order.product_id)
    .bind(&order.destination)
    .bind(order.amount)
    .bind(&order.currency)
    .bind(status)
    .bind(OffsetDateTime::now_utc())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
