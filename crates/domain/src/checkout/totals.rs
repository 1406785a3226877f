//! Charge total for a checkout attempt.

use serde::Serialize;

use super::{CarrierSelection, FieldError, ValidationError};
use crate::cart::Cart;
use crate::money::{MAX_CHARGE_CENTS, Money};

/// Amounts of one checkout attempt.
///
/// Computed once per attempt; `total` is both the authorized amount and the
/// persisted order amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub items_total: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CheckoutTotals {
    /// Fails when the total overflows or exceeds what a single charge can
    /// carry; nothing may be authorized for such a cart.
    pub fn compute(cart: &Cart, carrier: &CarrierSelection) -> Result<Self, ValidationError> {
        let shipping = carrier.price;
        let totals = cart.total().ok().and_then(|items_total| {
            let total = items_total.checked_add(shipping)?;
            Some(Self {
                items_total,
                shipping,
                total,
            })
        });
        match totals {
            Some(totals) if totals.total.is_chargeable() => Ok(totals),
            _ => Err(ValidationError::Invalid(vec![FieldError::new(
                "items",
                format!("order total must be at most {MAX_CHARGE_CENTS}"),
            )])),
        }
    }
}
