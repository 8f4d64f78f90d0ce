use tokio::sync::mpsc;

use super::types::OrderUpdated;

/// Default buffer size for event channels. Enough to absorb bursts while
/// keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for OrderUpdated events.
pub type OrderUpdatedSender = mpsc::Sender<OrderUpdated>;
/// Receiver handle for OrderUpdated events.
pub type OrderUpdatedReceiver = mpsc::Receiver<OrderUpdated>;

/// Create a new OrderUpdated channel. Multiple senders can be cloned from
/// the returned sender; the single receiver belongs to the fulfillment
/// synchronizer.
pub fn order_updated_channel() -> (OrderUpdatedSender, OrderUpdatedReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
