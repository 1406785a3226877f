//! Checkout error types.

use domain::{CartError, OrderNumber, ValidationError};
use store::StoreError;
use thiserror::Error;

use crate::phase::CheckoutPhase;

/// Errors raised by a payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor refused the authorization.
    #[error("Payment declined: {0}")]
    Declined(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Processor returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the processor response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The processor could not be reached.
    #[error("Payment processor unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while maintaining a stored cart.
#[derive(Debug, Error)]
pub enum CartServiceError {
    /// The mutation breaks a cart rule.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Loading or saving the cart failed.
    #[error("Cart store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures of a checkout session.
///
/// `Unauthenticated`, `InvalidBody` and `EmptyCart` are raised before any
/// side effect. `PaymentAuthorizationFailed` leaves nothing behind either.
/// `OrderPersistenceFailed` happens after the payment was authorized.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No signed-in user.
    #[error("Authentication required")]
    Unauthenticated,

    /// The body is not valid JSON or fails validation.
    #[error(transparent)]
    InvalidBody(#[from] ValidationError),

    /// Neither the stored cart nor the client snapshot has items.
    #[error("Cart is empty")]
    EmptyCart,

    /// The payment processor did not authorize the payment.
    #[error("Payment authorization failed for order {order_number}: {source}")]
    PaymentAuthorizationFailed {
        order_number: OrderNumber,
        source: PaymentError,
    },

    /// The payment was authorized but the pending order was not saved.
    #[error(
        "Order {order_number} was not saved after payment authorization {authorization_id}: {source}"
    )]
    OrderPersistenceFailed {
        order_number: OrderNumber,
        authorization_id: String,
        source: StoreError,
    },
}

impl CheckoutError {
    /// Returns true if the caller may retry the checkout right away.
    ///
    /// Retrying after `OrderPersistenceFailed` would request a second
    /// authorization while the first one is still held.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CheckoutError::OrderPersistenceFailed { .. })
    }

    /// Returns the phase the session reached before failing.
    pub fn phase(&self) -> CheckoutPhase {
        match self {
            CheckoutError::OrderPersistenceFailed { .. } => CheckoutPhase::AuthorizedButUnpersisted,
            _ => CheckoutPhase::NotStarted,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::Unauthenticated => "UNAUTHENTICATED",
            CheckoutError::InvalidBody(_) => "INVALID_BODY",
            CheckoutError::EmptyCart => "EMPTY_CART",
            CheckoutError::PaymentAuthorizationFailed { .. } => "PAYMENT_AUTHORIZATION_FAILED",
            CheckoutError::OrderPersistenceFailed { .. } => "ORDER_PERSISTENCE_FAILED",
        }
    }

    /// Short label used as the `reason` of failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CheckoutError::Unauthenticated => "unauthenticated",
            CheckoutError::InvalidBody(_) => "invalid_body",
            CheckoutError::EmptyCart => "empty_cart",
            CheckoutError::PaymentAuthorizationFailed { .. } => "payment_authorization",
            CheckoutError::OrderPersistenceFailed { .. } => "order_persistence",
        }
    }

    /// Order number of the failed attempt, once one was generated.
    pub fn order_number(&self) -> Option<&OrderNumber> {
        match self {
            CheckoutError::PaymentAuthorizationFailed { order_number, .. }
            | CheckoutError::OrderPersistenceFailed { order_number, .. } => Some(order_number),
            _ => None,
        }
    }
}
