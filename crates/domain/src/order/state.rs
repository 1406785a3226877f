//! Order status.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Checkout only ever creates `Pending` orders. Later transitions belong to
/// the fulfilment side:
/// ```text
/// Pending ──► Paid ──► Shipped ──► Delivered
///    │         │
///    └─────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Payment authorized, awaiting confirmation.
    #[default]
    Pending,

    Paid,

    Shipped,

    /// Terminal.
    Delivered,

    /// Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Returns the status as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses a stored status value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(OrderStatus::Pending),
            "PAID" => Some(OrderStatus::Paid),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
