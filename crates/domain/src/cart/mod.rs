//! Cart aggregate and its line items.

mod aggregate;
mod item;

pub use aggregate::Cart;
pub use item::{CartItem, CartItemBuilder, CartItemKey, MAX_QUANTITY, ProductId, VariantInfo};

use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A required text field was blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// Unit price below zero or above the single-charge limit.
    #[error("Invalid price: {cents}")]
    InvalidPrice { cents: i64 },

    /// Quantity outside the accepted range.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// The cart total does not fit in an amount.
    #[error("Cart total is too large")]
    TotalOverflow,

    /// No line with the given key.
    #[error("Item not found: {key}")]
    ItemNotFound { key: CartItemKey },
}
