//! Checkout request body and its boundary validation.
//!
//! The body arrives as loosely-typed JSON. [`CheckoutPayload`] mirrors that
//! shape with every field optional; [`CheckoutPayload::validate`] checks all
//! fields and either returns a fully typed [`CheckoutRequest`] or every
//! problem found, never just the first one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CarrierSelection, RelayPoint, ShippingAddress, ShippingMode};
use crate::cart::{CartError, CartItem, MAX_QUANTITY, VariantInfo};
use crate::money::{MAX_CHARGE_CENTS, Money};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON path of the field, e.g. `shippingAddress.city`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Why a checkout body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body is not JSON of the expected shape.
    #[error("Malformed request body: {0}")]
    MalformedJson(String),

    /// The body parsed but one or more fields are invalid.
    #[error("Invalid request body: {}", summarize(.0))]
    Invalid(Vec<FieldError>),
}

impl ValidationError {
    /// Returns the field errors, empty for malformed JSON.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::MalformedJson(_) => &[],
            ValidationError::Invalid(errors) => errors,
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw `shippingAddress` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// Raw `carrier.relayPoint` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPointPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

/// Raw `carrier` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierPayload {
    #[serde(alias = "id")]
    pub code: Option<String>,
    pub name: Option<String>,
    /// Price in the minor currency unit.
    pub price: Option<i64>,
    pub estimated_delivery: Option<String>,
    pub relay_point: Option<RelayPointPayload>,
}

/// Raw `variantInfo` object of a cart snapshot line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantInfoPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
}

/// A client-held cart line, submitted when the server-side cart is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemSnapshot {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub name: Option<String>,
    /// Unit price in the minor currency unit.
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
    pub variant_info: Option<VariantInfoPayload>,
    pub creator_slug: Option<String>,
}

impl CartItemSnapshot {
    /// Builds a cart item, enforcing the cart item rules.
    pub fn to_cart_item(&self) -> Result<CartItem, CartError> {
        let mut builder = CartItem::builder().quantity(self.quantity.unwrap_or(1));
        if let Some(product_id) = &self.product_id {
            builder = builder.product_id(product_id.as_str());
        }
        if let Some(variant_id) = &self.variant_id {
            builder = builder.variant_id(variant_id.as_str());
        }
        if let Some(name) = &self.name {
            builder = builder.name(name.as_str());
        }
        if let Some(price) = self.price {
            builder = builder.unit_price_cents(price);
        }
        if let Some(image) = &self.image {
            builder = builder.image(image.as_str());
        }
        if let Some(info) = &self.variant_info
            && let (Some(kind), Some(value)) = (&info.kind, &info.value)
        {
            builder = builder.variant_info(VariantInfo::new(kind.as_str(), value.as_str()));
        }
        if let Some(slug) = &self.creator_slug {
            builder = builder.creator_slug(slug.as_str());
        }
        builder.build()
    }
}

/// Raw body of `POST /checkout/create-session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub shipping_address: Option<AddressPayload>,
    pub carrier: Option<CarrierPayload>,
    pub shipping_mode: Option<String>,
    pub items: Option<Vec<CartItemSnapshot>>,
}

/// A validated checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    /// Carries a relay point if and only if `shipping_mode` is `RelayPoint`.
    pub carrier: CarrierSelection,
    pub shipping_mode: ShippingMode,
    /// Client-held cart snapshot; empty when none was submitted.
    pub items: Vec<CartItem>,
}

impl CheckoutRequest {
    /// Parses and validates a raw JSON body.
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        let payload: CheckoutPayload = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
        payload.validate()
    }
}

impl CheckoutPayload {
    /// Validates every field, collecting all failures.
    pub fn validate(self) -> Result<CheckoutRequest, ValidationError> {
        let mut errors = Vec::new();

        let shipping_address = match self.shipping_address {
            Some(address) => validate_address(address, &mut errors),
            None => {
                errors.push(FieldError::new("shippingAddress", "is required"));
                None
            }
        };

        let shipping_mode = match self.shipping_mode.as_deref() {
            Some(mode) => {
                let parsed = ShippingMode::parse(mode);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "shippingMode",
                        "must be RELAY_POINT or HOME_DELIVERY",
                    ));
                }
                parsed
            }
            None => {
                errors.push(FieldError::new("shippingMode", "is required"));
                None
            }
        };

        let carrier = match self.carrier {
            Some(carrier) => validate_carrier(carrier, shipping_mode, &mut errors),
            None => {
                errors.push(FieldError::new("carrier", "is required"));
                None
            }
        };

        let mut items = Vec::new();
        for (index, snapshot) in self.items.unwrap_or_default().iter().enumerate() {
            match snapshot.to_cart_item() {
                Ok(item) => items.push(item),
                Err(e) => errors.push(item_error(index, e)),
            }
        }

        match (shipping_address, carrier, shipping_mode) {
            (Some(shipping_address), Some(carrier), Some(shipping_mode)) if errors.is_empty() => {
                Ok(CheckoutRequest {
                    shipping_address,
                    carrier,
                    shipping_mode,
                    items,
                })
            }
            _ => Err(ValidationError::Invalid(errors)),
        }
    }
}

fn validate_address(
    address: AddressPayload,
    errors: &mut Vec<FieldError>,
) -> Option<ShippingAddress> {
    let first_name = required_text(address.first_name, "shippingAddress.firstName", errors);
    let last_name = required_text(address.last_name, "shippingAddress.lastName", errors);
    let street = required_text(address.street, "shippingAddress.street", errors);
    let city = required_text(address.city, "shippingAddress.city", errors);
    let postal_code = required_text(address.postal_code, "shippingAddress.postalCode", errors);
    let country = required_text(address.country, "shippingAddress.country", errors);

    if let Some(country) = &country
        && country.chars().count() < 2
    {
        errors.push(FieldError::new(
            "shippingAddress.country",
            "must be at least 2 characters",
        ));
        return None;
    }

    Some(ShippingAddress {
        first_name: first_name?,
        last_name: last_name?,
        street: street?,
        complement: optional_text(address.complement),
        city: city?,
        postal_code: postal_code?,
        country: country?,
        phone: optional_text(address.phone),
    })
}

fn validate_carrier(
    carrier: CarrierPayload,
    mode: Option<ShippingMode>,
    errors: &mut Vec<FieldError>,
) -> Option<CarrierSelection> {
    let code = required_text(carrier.code, "carrier.code", errors);
    let name = required_text(carrier.name, "carrier.name", errors);
    let estimated_delivery =
        required_text(carrier.estimated_delivery, "carrier.estimatedDelivery", errors);

    let price = match carrier.price {
        Some(cents) if (0..=MAX_CHARGE_CENTS).contains(&cents) => {
            Some(Money::from_cents(cents))
        }
        Some(cents) => {
            errors.push(FieldError::new("carrier.price", price_message(cents)));
            None
        }
        None => {
            errors.push(FieldError::new("carrier.price", "is required"));
            None
        }
    };

    let relay_point = match (mode, carrier.relay_point) {
        (Some(ShippingMode::RelayPoint), Some(relay)) => {
            Some(validate_relay_point(relay, errors)?)
        }
        (Some(ShippingMode::RelayPoint), None) => {
            errors.push(FieldError::new(
                "carrier.relayPoint",
                "is required for RELAY_POINT delivery",
            ));
            return None;
        }
        // Home delivery never carries a pickup location.
        _ => None,
    };

    Some(CarrierSelection {
        code: code?,
        name: name?,
        price: price?,
        estimated_delivery: estimated_delivery?,
        relay_point,
    })
}

fn validate_relay_point(
    relay: RelayPointPayload,
    errors: &mut Vec<FieldError>,
) -> Option<RelayPoint> {
    let id = required_text(relay.id, "carrier.relayPoint.id", errors);
    let name = required_text(relay.name, "carrier.relayPoint.name", errors);
    let address = required_text(relay.address, "carrier.relayPoint.address", errors);
    let city = required_text(relay.city, "carrier.relayPoint.city", errors);
    let postal_code = required_text(relay.postal_code, "carrier.relayPoint.postalCode", errors);

    Some(RelayPoint {
        id: id?,
        name: name?,
        address: address?,
        city: city?,
        postal_code: postal_code?,
    })
}

fn item_error(index: usize, error: CartError) -> FieldError {
    match error {
        CartError::MissingField { field } => {
            FieldError::new(format!("items[{index}].{field}"), "is required")
        }
        CartError::InvalidPrice { cents } => {
            FieldError::new(format!("items[{index}].price"), price_message(cents))
        }
        CartError::InvalidQuantity { .. } => FieldError::new(
            format!("items[{index}].quantity"),
            format!("must be between 1 and {MAX_QUANTITY}"),
        ),
        CartError::TotalOverflow | CartError::ItemNotFound { .. } => {
            FieldError::new(format!("items[{index}]"), error.to_string())
        }
    }
}

fn price_message(cents: i64) -> String {
    if cents < 0 {
        "must not be negative".to_string()
    } else {
        format!("must be at most {MAX_CHARGE_CENTS}")
    }
}

fn required_text(
    value: Option<String>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = optional_text(value);
    if value.is_none() {
        errors.push(FieldError::new(field, "is required"));
    }
    value
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
