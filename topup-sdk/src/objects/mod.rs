pub mod error;
pub mod order;

pub use error::ErrorCode;
pub use order::{
    AuthSource, CreateOrderRequest, CreateOrderResponse, ErrorBody, MarkOrderRequest,
    MarkOrderResponse, OrderStatus,
};
