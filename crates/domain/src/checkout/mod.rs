//! Checkout inputs, boundary validation, totals and step sequencing.

mod request;
mod shipping;
mod steps;
mod totals;

pub use request::{
    AddressPayload, CarrierPayload, CartItemSnapshot, CheckoutPayload, CheckoutRequest,
    FieldError, RelayPointPayload, ValidationError, VariantInfoPayload,
};
pub use shipping::{CarrierSelection, RelayPoint, ShippingAddress, ShippingMode};
pub use steps::{CarrierChoice, CheckoutContext, CheckoutStep, Destination, StepDecision, StepError};
pub use totals::CheckoutTotals;
