//! Cart line items and their identity key.

use serde::{Deserialize, Serialize};

use super::CartError;
use crate::money::{MAX_CHARGE_CENTS, Money};

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 9_999;

/// Catalog product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of a cart line: `productId`, or `productId:variantId` when a
/// variant is set.
///
/// Two items with equal keys are the same line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemKey(String);

impl CartItemKey {
    /// Computes the key for a product and optional variant.
    ///
    /// A blank variant is the same as no variant.
    pub fn new(product_id: &str, variant_id: Option<&str>) -> Self {
        match variant_id.map(str::trim).filter(|v| !v.is_empty()) {
            Some(variant) => Self(format!("{product_id}:{variant}")),
            None => Self(product_id.to_string()),
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CartItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable description of the chosen variant, e.g. `{size, "M"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    /// Variant dimension ("size", "color", ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Selected value for that dimension.
    pub value: String,
}

impl VariantInfo {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// A line in a cart.
///
/// Constructed only through [`CartItem::builder`], which enforces the field
/// rules; the owning [`Cart`](super::Cart) mutates the quantity in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    product_id: ProductId,
    variant_id: Option<String>,
    name: String,
    pub(super) unit_price: Money,
    pub(super) quantity: u32,
    image: Option<String>,
    variant_info: Option<VariantInfo>,
    creator_slug: String,
}

impl CartItem {
    /// Returns a builder for a new item. Quantity defaults to 1.
    pub fn builder() -> CartItemBuilder {
        CartItemBuilder::default()
    }

    /// Returns the identity key of this line.
    pub fn key(&self) -> CartItemKey {
        CartItemKey::new(self.product_id.as_str(), self.variant_id.as_deref())
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn variant_info(&self) -> Option<&VariantInfo> {
        self.variant_info.as_ref()
    }

    /// Slug of the creator page this product was added from.
    pub fn creator_slug(&self) -> &str {
        &self.creator_slug
    }

    /// Returns the total price for this line (quantity * unit_price), `None`
    /// on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Validating factory for [`CartItem`].
#[derive(Debug, Clone, Default)]
pub struct CartItemBuilder {
    product_id: Option<String>,
    variant_id: Option<String>,
    name: Option<String>,
    unit_price_cents: Option<i64>,
    quantity: Option<i64>,
    image: Option<String>,
    variant_info: Option<VariantInfo>,
    creator_slug: Option<String>,
}

impl CartItemBuilder {
    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn variant_id(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the unit price in the minor currency unit.
    pub fn unit_price_cents(mut self, cents: i64) -> Self {
        self.unit_price_cents = Some(cents);
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn variant_info(mut self, info: VariantInfo) -> Self {
        self.variant_info = Some(info);
        self
    }

    pub fn creator_slug(mut self, slug: impl Into<String>) -> Self {
        self.creator_slug = Some(slug.into());
        self
    }

    /// Builds the item.
    ///
    /// Fails on a blank product ID, name or creator slug, a missing price or
    /// one outside `0..=MAX_CHARGE_CENTS`, or a quantity outside
    /// `1..=MAX_QUANTITY`.
    pub fn build(self) -> Result<CartItem, CartError> {
        let product_id = required(self.product_id, "productId")?;
        let name = required(self.name, "name")?;
        let creator_slug = required(self.creator_slug, "creatorSlug")?;

        let cents = self
            .unit_price_cents
            .ok_or(CartError::MissingField { field: "price" })?;
        if !(0..=MAX_CHARGE_CENTS).contains(&cents) {
            return Err(CartError::InvalidPrice { cents });
        }

        let quantity = self.quantity.unwrap_or(1);
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| (1..=MAX_QUANTITY).contains(q))
            .ok_or(CartError::InvalidQuantity { quantity })?;

        Ok(CartItem {
            product_id: ProductId::new(product_id),
            variant_id: non_blank(self.variant_id),
            name,
            unit_price: Money::from_cents(cents),
            quantity,
            image: non_blank(self.image),
            variant_info: self.variant_info,
            creator_slug,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, CartError> {
    non_blank(value).ok_or(CartError::MissingField { field })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> CartItemBuilder {
        CartItem::builder()
            .product_id("p1")
            .name("Print A3")
            .unit_price_cents(2500)
            .creator_slug("studio-lune")
    }

    #[test]
    fn test_key_without_variant_is_product_id() {
        let item = widget().build().unwrap();
        assert_eq!(item.key().as_str(), "p1");
    }

    #[test]
    fn test_key_with_variant() {
        let item = widget().variant_id("red").build().unwrap();
        assert_eq!(item.key().as_str(), "p1:red");
        assert_eq!(item.key(), CartItemKey::new("p1", Some("red")));
    }

    #[test]
    fn test_blank_variant_is_no_variant() {
        let item = widget().variant_id("  ").build().unwrap();
        assert_eq!(item.variant_id(), None);
        assert_eq!(item.key(), CartItemKey::new("p1", None));
        assert_eq!(CartItemKey::new("p1", Some("")), CartItemKey::new("p1", None));
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let item = widget().build().unwrap();
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.line_total(), Some(Money::from_cents(2500)));
    }

    #[test]
    fn test_rejects_blank_required_fields() {
        let err = widget().product_id(" ").build().unwrap_err();
        assert_eq!(err, CartError::MissingField { field: "productId" });

        let err = widget().name("").build().unwrap_err();
        assert_eq!(err, CartError::MissingField { field: "name" });

        let err = CartItem::builder()
            .product_id("p1")
            .name("Print")
            .unit_price_cents(100)
            .build()
            .unwrap_err();
        assert_eq!(err, CartError::MissingField { field: "creatorSlug" });
    }

    #[test]
    fn test_rejects_negative_price() {
        let err = widget().unit_price_cents(-1).build().unwrap_err();
        assert_eq!(err, CartError::InvalidPrice { cents: -1 });
    }

    #[test]
    fn test_rejects_price_above_charge_limit() {
        let item = widget().unit_price_cents(MAX_CHARGE_CENTS).build().unwrap();
        assert_eq!(item.unit_price().cents(), MAX_CHARGE_CENTS);

        let err = widget().unit_price_cents(i64::MAX).build().unwrap_err();
        assert_eq!(err, CartError::InvalidPrice { cents: i64::MAX });
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let item = widget().unit_price_cents(0).build().unwrap();
        assert!(item.unit_price().is_zero());
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        assert!(matches!(
            widget().quantity(0).build(),
            Err(CartError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            widget().quantity(-3).build(),
            Err(CartError::InvalidQuantity { quantity: -3 })
        ));
    }

    #[test]
    fn test_rejects_quantity_above_line_limit() {
        let item = widget().quantity(i64::from(MAX_QUANTITY)).build().unwrap();
        assert_eq!(item.quantity(), MAX_QUANTITY);

        assert!(matches!(
            widget().quantity(i64::from(u32::MAX)).build(),
            Err(CartError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let item = widget()
            .variant_id("m")
            .variant_info(VariantInfo::new("size", "M"))
            .build()
            .unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["unitPrice"], 2500);
        assert_eq!(json["creatorSlug"], "studio-lune");
        assert_eq!(json["variantInfo"]["type"], "size");
    }
}
