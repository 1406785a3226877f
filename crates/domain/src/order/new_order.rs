//! Orders as created by checkout.

use common::{CreatorId, UserId};
use serde::{Deserialize, Serialize};

use super::{OrderNumber, OrderStatus};
use crate::checkout::{CheckoutRequest, CheckoutTotals, ShippingAddress, ShippingMode};
use crate::money::Money;

/// A pending order ready to be persisted.
///
/// Built once per checkout attempt, after the payment authorization exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub creator_id: CreatorId,
    pub customer_id: UserId,
    pub customer_email: String,
    pub status: OrderStatus,

    /// Items plus shipping, in cents.
    pub total_amount: Money,
    pub shipping_address: ShippingAddress,
    pub shipping_mode: ShippingMode,

    /// Set only for relay-point delivery.
    pub relay_point_id: Option<String>,
    pub relay_point_name: Option<String>,
    pub shipping_cost: Money,

    /// Carrier code.
    pub carrier: String,

    /// Reference of the payment processor's authorization.
    pub payment_reference: String,
}

impl NewOrder {
    /// Assembles a `Pending` order from a validated checkout request.
    pub fn pending(
        order_number: OrderNumber,
        creator_id: CreatorId,
        customer_id: UserId,
        customer_email: impl Into<String>,
        request: &CheckoutRequest,
        totals: &CheckoutTotals,
        payment_reference: impl Into<String>,
    ) -> Self {
        let relay_point = request.carrier.relay_point.as_ref();

        Self {
            order_number,
            creator_id,
            customer_id,
            customer_email: customer_email.into(),
            status: OrderStatus::Pending,
            total_amount: totals.total,
            shipping_address: request.shipping_address.clone(),
            shipping_mode: request.shipping_mode,
            relay_point_id: relay_point.map(|r| r.id.clone()),
            relay_point_name: relay_point.map(|r| r.name.clone()),
            shipping_cost: totals.shipping,
            carrier: request.carrier.code.clone(),
            payment_reference: payment_reference.into(),
        }
    }
}
