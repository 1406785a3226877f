//! Orders created by checkout.

mod new_order;
mod number;
mod state;

pub use new_order::NewOrder;
pub use number::OrderNumber;
pub use state::OrderStatus;

use thiserror::Error;

/// Errors that can occur when handling order values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Not of the form `ORD-<timestamp>-<suffix>`.
    #[error("Invalid order number: {value}")]
    InvalidOrderNumber { value: String },
}
