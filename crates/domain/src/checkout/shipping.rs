//! Shipping address and carrier selection.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Delivery address, already validated at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub complement: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Returns "first last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// How the parcel reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMode {
    HomeDelivery,
    RelayPoint,
}

impl ShippingMode {
    /// Returns the wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMode::HomeDelivery => "HOME_DELIVERY",
            ShippingMode::RelayPoint => "RELAY_POINT",
        }
    }

    /// Parses the wire name of a mode.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HOME_DELIVERY" => Some(ShippingMode::HomeDelivery),
            "RELAY_POINT" => Some(ShippingMode::RelayPoint),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShippingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pickup location chosen for a relay-point carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPoint {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// The carrier offer picked by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierSelection {
    /// Carrier code, e.g. `colissimo` or `mondial_relay`.
    pub code: String,
    pub name: String,
    /// Shipping price in the minor currency unit.
    pub price: Money,
    pub estimated_delivery: String,
    /// Present only for relay-point carriers.
    pub relay_point: Option<RelayPoint>,
}
