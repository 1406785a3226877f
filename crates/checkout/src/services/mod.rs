//! External services used by checkout.

pub mod payment;
pub mod stripe;

pub use payment::{
    AuthorizationRequest, InMemoryPaymentProcessor, PaymentAuthorization, PaymentMetadata,
    PaymentProcessor,
};
pub use stripe::StripePaymentProcessor;
