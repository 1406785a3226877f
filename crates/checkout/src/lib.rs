//! Checkout application services.
//!
//! This crate turns a cart plus a shipping and carrier selection into an
//! authorized payment and a persisted pending order. A checkout session runs
//! these steps in order:
//! 1. Require an authenticated identity
//! 2. Validate the request body
//! 3. Resolve the cart, falling back to the client snapshot
//! 4. Compute the charge total once
//! 5. Attribute the order to a creator
//! 6. Generate the order number
//! 7. Authorize the payment
//! 8. Persist the pending order
//! 9. Clear the cart, best effort
//!
//! There is no compensation between steps 7 and 8. A failure in step 8
//! leaves an authorization without an order, reported as
//! [`CheckoutPhase::AuthorizedButUnpersisted`] for reconciliation.

pub mod cart_service;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod phase;
pub mod services;

pub use cart_service::CartService;
pub use error::{CartServiceError, CheckoutError, PaymentError};
pub use identity::Identity;
pub use orchestrator::{CartSource, CheckoutOrchestrator, CheckoutSession};
pub use phase::CheckoutPhase;
pub use services::{
    AuthorizationRequest, InMemoryPaymentProcessor, PaymentAuthorization, PaymentMetadata,
    PaymentProcessor, StripePaymentProcessor,
};
