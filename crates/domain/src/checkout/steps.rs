//! Checkout step sequencing.
//!
//! The storefront client threads one checkout attempt through a fixed
//! sequence of steps:
//!
//! ```text
//! Identify ──► Shipping ──► Carrier (──► relay point) ──► Payment ──► Confirmation
//! ```
//!
//! Each step has an entry guard over the [`CheckoutContext`]. A guard either
//! lets the client proceed or redirects it to an earlier step (or to the cart
//! view). The context is held in session-scoped client storage and is never
//! persisted server-side.

use common::OrderId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CarrierSelection, RelayPoint, ShippingAddress, ShippingMode};
use crate::cart::Cart;

/// Steps of a checkout attempt, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Sign in or continue as guest.
    Identify,
    Shipping,
    Carrier,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Identify => "Identify",
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Carrier => "Carrier",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Confirmation",
        }
    }

    /// Returns the next step, `None` after confirmation.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Identify => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Carrier),
            CheckoutStep::Carrier => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Confirmation),
            CheckoutStep::Confirmation => None,
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a guard sends the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// The cart view, outside the checkout flow.
    Cart,
    Step(CheckoutStep),
}

/// Outcome of an entry guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDecision {
    Proceed,
    Redirect(Destination),
}

/// Errors raised while filling the context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// A relay point was chosen without a relay-point carrier.
    #[error("No relay-point carrier is selected")]
    NotARelayCarrier,
}

/// Carrier picked in the `Carrier` step, with the delivery mode it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierChoice {
    pub selection: CarrierSelection,
    pub mode: ShippingMode,
}

impl CarrierChoice {
    /// A relay-point choice is complete only once a pickup point is chosen.
    pub fn is_complete(&self) -> bool {
        match self.mode {
            ShippingMode::HomeDelivery => true,
            ShippingMode::RelayPoint => self.selection.relay_point.is_some(),
        }
    }
}

/// State of one checkout attempt, passed between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContext {
    cart_item_count: u64,
    shipping_address: Option<ShippingAddress>,
    carrier: Option<CarrierChoice>,
    confirmed_order: Option<OrderId>,
}

impl CheckoutContext {
    /// Starts an attempt for the given cart.
    pub fn for_cart(cart: &Cart) -> Self {
        Self {
            cart_item_count: cart.item_count(),
            ..Self::default()
        }
    }

    /// Refreshes the cart size after the cart changed elsewhere.
    pub fn sync_cart(&mut self, cart: &Cart) {
        self.cart_item_count = cart.item_count();
    }

    pub fn cart_is_empty(&self) -> bool {
        self.cart_item_count == 0
    }

    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    pub fn set_shipping_address(&mut self, address: ShippingAddress) {
        self.shipping_address = Some(address);
    }

    /// Records the chosen carrier. Any earlier choice, including its relay
    /// point, is replaced.
    pub fn select_carrier(&mut self, selection: CarrierSelection, mode: ShippingMode) {
        let selection = match mode {
            ShippingMode::HomeDelivery => CarrierSelection {
                relay_point: None,
                ..selection
            },
            ShippingMode::RelayPoint => selection,
        };
        self.carrier = Some(CarrierChoice { selection, mode });
    }

    /// Picks the pickup location for the selected relay-point carrier.
    pub fn choose_relay_point(&mut self, relay_point: RelayPoint) -> Result<(), StepError> {
        match &mut self.carrier {
            Some(choice) if choice.mode == ShippingMode::RelayPoint => {
                choice.selection.relay_point = Some(relay_point);
                Ok(())
            }
            _ => Err(StepError::NotARelayCarrier),
        }
    }

    /// True while a relay-point carrier waits for its pickup location.
    pub fn awaiting_relay_point(&self) -> bool {
        self.carrier.as_ref().is_some_and(|c| !c.is_complete())
    }

    /// Returns the carrier choice once it is complete.
    pub fn carrier(&self) -> Option<&CarrierChoice> {
        self.carrier.as_ref().filter(|c| c.is_complete())
    }

    /// Returns true if the forward transition from `Carrier` is allowed.
    pub fn can_advance_to_payment(&self) -> bool {
        self.carrier().is_some()
    }

    /// Records a successful checkout round trip.
    pub fn confirm(&mut self, order_id: OrderId) {
        self.confirmed_order = Some(order_id);
    }

    pub fn confirmed_order(&self) -> Option<OrderId> {
        self.confirmed_order
    }

    /// Runs the entry guard of `step`.
    pub fn enter(&self, step: CheckoutStep) -> StepDecision {
        match step {
            CheckoutStep::Identify => StepDecision::Proceed,
            CheckoutStep::Shipping => {
                if self.cart_is_empty() {
                    StepDecision::Redirect(Destination::Cart)
                } else {
                    StepDecision::Proceed
                }
            }
            CheckoutStep::Carrier => {
                if self.shipping_address.is_none() {
                    StepDecision::Redirect(Destination::Step(CheckoutStep::Shipping))
                } else {
                    StepDecision::Proceed
                }
            }
            CheckoutStep::Payment => {
                if self.cart_is_empty() {
                    StepDecision::Redirect(Destination::Cart)
                } else if !self.can_advance_to_payment() {
                    StepDecision::Redirect(Destination::Step(CheckoutStep::Carrier))
                } else {
                    StepDecision::Proceed
                }
            }
            CheckoutStep::Confirmation => {
                if self.confirmed_order.is_some() {
                    StepDecision::Proceed
                } else {
                    match self.enter(CheckoutStep::Payment) {
                        StepDecision::Proceed => {
                            StepDecision::Redirect(Destination::Step(CheckoutStep::Payment))
                        }
                        redirect => redirect,
                    }
                }
            }
        }
    }
}
