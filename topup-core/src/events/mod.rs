//! Event plumbing for the asynchronous fulfillment pipeline.
//!
//! Entry-point handlers emit an [`OrderUpdated`] notification after each
//! committed transition; the fulfillment synchronizer consumes the stream
//! and reacts to the one edge it cares about. Delivery is assumed
//! at-least-once, so consumers must be idempotent — events carry
//! identifiers and the observed edge, never authoritative state.

pub mod channels;
pub mod types;

pub use channels::{DEFAULT_CHANNEL_BUFFER, OrderUpdatedReceiver, OrderUpdatedSender, order_updated_channel};
pub use types::OrderUpdated;
