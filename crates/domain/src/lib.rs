//! Domain layer for the creator marketplace storefront.
//!
//! This crate provides the core checkout abstractions including:
//! - Cart aggregate with add-or-increment and merge semantics
//! - Checkout input types and boundary validation of the request body
//! - Order numbers and the pending order created by checkout
//! - Checkout step sequencing with per-step entry guards
//!
//! Nothing here performs I/O.

pub mod cart;
pub mod checkout;
pub mod money;
pub mod order;

pub use cart::{Cart, CartError, CartItem, CartItemBuilder, CartItemKey, ProductId, VariantInfo};
pub use checkout::{
    CarrierChoice, CarrierSelection, CartItemSnapshot, CheckoutContext, CheckoutPayload,
    CheckoutRequest, CheckoutStep, CheckoutTotals, Destination, FieldError, RelayPoint,
    ShippingAddress, ShippingMode, StepDecision, StepError, ValidationError,
};
pub use money::{MAX_CHARGE_CENTS, Money};
pub use order::{NewOrder, OrderError, OrderNumber, OrderStatus};
