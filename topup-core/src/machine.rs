//! Order lifecycle transition rules.
//!
//! Each entry point has one decision function, evaluated by the store
//! against the freshly read order. The legal edges:
//!
//! ```text
//! PENDING ──> PAID ──> COMPLETED ──> REFUNDED
//!    │          └───────────────────────^
//!    ├──> FAILED
//!    └──> CANCELLED
//! ```
//!
//! `FAILED`, `CANCELLED`, `REFUNDED` are terminal. `COMPLETED` is terminal
//! except for the refund edge. Requests that find the order already in the
//! target state, or in a terminal state that supersedes them, become
//! no-ops; everything else off the diagram is rejected.

use crate::entities::{Order, OrderEventType, OrderStatus};
use crate::store::{FulfillmentAction, NoopReason, TransitionDecision, TransitionStep};

/// Manual sandbox payment confirmation.
pub fn decide_mark_paid(order: &Order) -> TransitionDecision {
    match order.status {
        OrderStatus::Paid | OrderStatus::Completed => TransitionDecision::Noop {
            reason: NoopReason::AlreadyInTarget,
            fulfillment: None,
        },
        OrderStatus::Pending => TransitionDecision::Execute(TransitionStep {
            to: OrderStatus::Paid,
            event: OrderEventType::PaidStub,
            fulfillment: None,
        }),
        OrderStatus::Failed | OrderStatus::Cancelled | OrderStatus::Refunded => {
            TransitionDecision::Reject
        }
    }
}

/// Failing a paid order is meaningless rather than illegal: the terminal
/// branch answers success without touching it.
pub fn decide_mark_failed(order: &Order) -> TransitionDecision {
    match order.status {
        OrderStatus::Failed => TransitionDecision::Noop {
            reason: NoopReason::AlreadyInTarget,
            fulfillment: None,
        },
        OrderStatus::Paid | OrderStatus::Completed => TransitionDecision::Noop {
            reason: NoopReason::Terminal,
            fulfillment: None,
        },
        OrderStatus::Pending => TransitionDecision::Execute(TransitionStep {
            to: OrderStatus::Failed,
            event: OrderEventType::Failed,
            fulfillment: None,
        }),
        OrderStatus::Cancelled | OrderStatus::Refunded => TransitionDecision::Reject,
    }
}

pub fn decide_mark_cancelled(order: &Order) -> TransitionDecision {
    match order.status {
        OrderStatus::Cancelled => TransitionDecision::Noop {
            reason: NoopReason::AlreadyInTarget,
            fulfillment: None,
        },
        OrderStatus::Failed | OrderStatus::Paid | OrderStatus::Completed => {
            TransitionDecision::Noop {
                reason: NoopReason::Terminal,
                fulfillment: None,
            }
        }
        OrderStatus::Pending => TransitionDecision::Execute(TransitionStep {
            to: OrderStatus::Cancelled,
            event: OrderEventType::Cancelled,
            fulfillment: None,
        }),
        OrderStatus::Refunded => TransitionDecision::Reject,
    }
}

/// Refunds are only reachable from `PAID` or `COMPLETED`. An idempotent
/// replay re-syncs the fulfillment record in case an earlier refund never
/// got mirrored there.
pub fn decide_mark_refunded(order: &Order) -> TransitionDecision {
    match order.status {
        OrderStatus::Refunded => TransitionDecision::Noop {
            reason: NoopReason::AlreadyInTarget,
            fulfillment: Some(FulfillmentAction::Refund),
        },
        OrderStatus::Cancelled | OrderStatus::Failed => TransitionDecision::Noop {
            reason: NoopReason::Terminal,
            fulfillment: None,
        },
        OrderStatus::Paid | OrderStatus::Completed => TransitionDecision::Execute(TransitionStep {
            to: OrderStatus::Refunded,
            event: OrderEventType::Refunded,
            fulfillment: Some(FulfillmentAction::Refund),
        }),
        OrderStatus::Pending => TransitionDecision::Reject,
    }
}

/// The only path that advances `PAID` to `COMPLETED`. The marker check
/// plus the in-transaction status re-read make redelivered notifications
/// harmless.
pub fn decide_fulfillment(order: &Order) -> TransitionDecision {
    if order.recarga_synced_at.is_some() || order.status == OrderStatus::Completed {
        return TransitionDecision::Noop {
            reason: NoopReason::AlreadyInTarget,
            fulfillment: None,
        };
    }
    if order.status == OrderStatus::Paid {
        TransitionDecision::Execute(TransitionStep {
            to: OrderStatus::Completed,
            event: OrderEventType::Completed,
            fulfillment: Some(FulfillmentAction::Complete),
        })
    } else {
        // The order moved off PAID before we got here; the window closed.
        TransitionDecision::Reject
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::entities::{AuthSource, OrderChannel};

    fn order_in(status: OrderStatus) -> Order {
        Order {
            order_id: Uuid::new_v4(),
            uid: "user-1".into(),
            product_id: "cubacel-20".into(),
            destination: "+5353712345".into(),
            amount: Decimal::new(2084, 2),
            currency: "EUR".into(),
            channel: OrderChannel::Sandbox,
            status,
            auth_source: AuthSource::Token,
            created_at: OffsetDateTime::now_utc(),
            paid_at: None,
            failed_at: None,
            cancelled_at: None,
            refunded_at: None,
            fulfilled_at: None,
            recarga_synced_at: None,
        }
    }

    fn executes_to(decision: TransitionDecision) -> Option<OrderStatus> {
        match decision {
            TransitionDecision::Execute(step) => Some(step.to),
            _ => None,
        }
    }

    #[test]
    fn mark_paid_decision_table() {
        assert_eq!(
            executes_to(decide_mark_paid(&order_in(OrderStatus::Pending))),
            Some(OrderStatus::Paid)
        );
        for s in [OrderStatus::Paid, OrderStatus::Completed] {
            assert!(matches!(
                decide_mark_paid(&order_in(s)),
                TransitionDecision::Noop { reason: NoopReason::AlreadyInTarget, .. }
            ));
        }
        for s in [OrderStatus::Failed, OrderStatus::Cancelled, OrderStatus::Refunded] {
            assert_eq!(decide_mark_paid(&order_in(s)), TransitionDecision::Reject);
        }
    }

    #[test]
    fn mark_failed_decision_table() {
        assert_eq!(
            executes_to(decide_mark_failed(&order_in(OrderStatus::Pending))),
            Some(OrderStatus::Failed)
        );
        assert!(matches!(
            decide_mark_failed(&order_in(OrderStatus::Failed)),
            TransitionDecision::Noop { reason: NoopReason::AlreadyInTarget, .. }
        ));
        for s in [OrderStatus::Paid, OrderStatus::Completed] {
            assert!(matches!(
                decide_mark_failed(&order_in(s)),
                TransitionDecision::Noop { reason: NoopReason::Terminal, .. }
            ));
        }
        for s in [OrderStatus::Cancelled, OrderStatus::Refunded] {
            assert_eq!(decide_mark_failed(&order_in(s)), TransitionDecision::Reject);
        }
    }

    #[test]
    fn mark_cancelled_decision_table() {
        assert_eq!(
            executes_to(decide_mark_cancelled(&order_in(OrderStatus::Pending))),
            Some(OrderStatus::Cancelled)
        );
        assert!(matches!(
            decide_mark_cancelled(&order_in(OrderStatus::Cancelled)),
            TransitionDecision::Noop { reason: NoopReason::AlreadyInTarget, .. }
        ));
        for s in [OrderStatus::Failed, OrderStatus::Paid, OrderStatus::Completed] {
            assert!(matches!(
                decide_mark_cancelled(&order_in(s)),
                TransitionDecision::Noop { reason: NoopReason::Terminal, .. }
            ));
        }
        assert_eq!(
            decide_mark_cancelled(&order_in(OrderStatus::Refunded)),
            TransitionDecision::Reject
        );
    }

    #[test]
    fn mark_refunded_decision_table() {
        for s in [OrderStatus::Paid, OrderStatus::Completed] {
            assert_eq!(
                executes_to(decide_mark_refunded(&order_in(s))),
                Some(OrderStatus::Refunded)
            );
        }
        assert!(matches!(
            decide_mark_refunded(&order_in(OrderStatus::Refunded)),
            TransitionDecision::Noop {
                reason: NoopReason::AlreadyInTarget,
                fulfillment: Some(FulfillmentAction::Refund),
            }
        ));
        for s in [OrderStatus::Cancelled, OrderStatus::Failed] {
            assert!(matches!(
                decide_mark_refunded(&order_in(s)),
                TransitionDecision::Noop { reason: NoopReason::Terminal, fulfillment: None }
            ));
        }
        assert_eq!(
            decide_mark_refunded(&order_in(OrderStatus::Pending)),
            TransitionDecision::Reject
        );
    }

    #[test]
    fn fulfillment_only_fires_on_unsynced_paid_orders() {
        assert_eq!(
            executes_to(decide_fulfillment(&order_in(OrderStatus::Paid))),
            Some(OrderStatus::Completed)
        );

        let mut synced = order_in(OrderStatus::Paid);
        synced.recarga_synced_at = Some(OffsetDateTime::now_utc());
        assert!(matches!(
            decide_fulfillment(&synced),
            TransitionDecision::Noop { reason: NoopReason::AlreadyInTarget, .. }
        ));

        assert!(matches!(
            decide_fulfillment(&order_in(OrderStatus::Completed)),
            TransitionDecision::Noop { .. }
        ));
        for s in [OrderStatus::Pending, OrderStatus::Refunded, OrderStatus::Failed] {
            assert_eq!(decide_fulfillment(&order_in(s)), TransitionDecision::Reject);
        }
    }

    /// No decision function ever produces an edge outside the lifecycle
    /// diagram.
    #[test]
    fn no_decision_leaves_the_state_diagram() {
        let legal: &[(OrderStatus, OrderStatus)] = &[
            (OrderStatus::Pending, OrderStatus::Paid),
            (OrderStatus::Pending, OrderStatus::Failed),
            (OrderStatus::Pending, OrderStatus::Cancelled),
            (OrderStatus::Paid, OrderStatus::Completed),
            (OrderStatus::Paid, OrderStatus::Refunded),
            (OrderStatus::Completed, OrderStatus::Refunded),
        ];
        let all = [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Completed,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ];
        let deciders: &[fn(&Order) -> TransitionDecision] = &[
            decide_mark_paid,
            decide_mark_failed,
            decide_mark_cancelled,
            decide_mark_refunded,
            decide_fulfillment,
        ];
        for decide in deciders {
            for from in all {
                if let TransitionDecision::Execute(step) = decide(&order_in(from)) {
                    assert!(
                        legal.contains(&(from, step.to)),
                        "illegal edge {from:?} -> {:?}",
                        step.to
                    );
                }
            }
        }
    }
}
