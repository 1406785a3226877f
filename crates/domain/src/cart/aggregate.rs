//! Cart aggregate root.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::Serialize;

use super::{CartError, CartItem, CartItemKey, MAX_QUANTITY};
use crate::money::Money;

/// A shopper's cart.
///
/// Owns its items exclusively. Item keys are unique within a cart and no
/// line is ever held with quantity 0. Totals are derived on every call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owner of the cart; `None` for a guest cart.
    user_id: Option<UserId>,

    /// Lines in insertion order.
    items: Vec<CartItem>,

    updated_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates an empty guest cart.
    pub fn new() -> Self {
        Self {
            user_id: None,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Creates an empty cart bound to a user.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::new()
        }
    }

    /// Reconstitutes a cart from storage.
    ///
    /// Items are folded through [`Cart::add_item`], so duplicate keys in the
    /// stored rows collapse into one line.
    pub fn restore(
        user_id: Option<UserId>,
        items: impl IntoIterator<Item = CartItem>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut cart = Self {
            user_id,
            items: Vec::new(),
            updated_at,
        };
        for item in items {
            cart.upsert(item);
        }
        cart
    }
}

// Query methods
impl Cart {
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the line for a product and optional variant.
    pub fn get_item(&self, product_id: &str, variant_id: Option<&str>) -> Option<&CartItem> {
        let key = CartItemKey::new(product_id, variant_id);
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> Result<Money, CartError> {
        self.items
            .iter()
            .map(CartItem::line_total)
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line?))
            .ok_or(CartError::TotalOverflow)
    }

    /// Consumes the cart, returning its lines.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

// Command methods
impl Cart {
    /// Adds an item, or increments the existing line with the same key by
    /// the incoming quantity, capped at [`MAX_QUANTITY`].
    pub fn add_item(&mut self, item: CartItem) {
        self.upsert(item);
        self.touch();
    }

    /// Removes the line for a product and optional variant.
    pub fn remove_item(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> Result<CartItem, CartError> {
        let key = CartItemKey::new(product_id, variant_id);
        let index = self
            .position(&key)
            .ok_or(CartError::ItemNotFound { key })?;
        let removed = self.items.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Overwrites the quantity of an existing line.
    ///
    /// A quantity of 0 removes the line; a negative quantity or one above
    /// [`MAX_QUANTITY`] is rejected.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
        variant_id: Option<&str>,
    ) -> Result<(), CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        if quantity == 0 {
            return self.remove_item(product_id, variant_id).map(|_| ());
        }
        let new_quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or(CartError::InvalidQuantity { quantity })?;

        let key = CartItemKey::new(product_id, variant_id);
        let index = self
            .position(&key)
            .ok_or(CartError::ItemNotFound { key })?;
        self.items[index].quantity = new_quantity;
        self.touch();
        Ok(())
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Folds every item of `other` into this cart, in `other`'s order, using
    /// the same add-or-increment rule as [`Cart::add_item`].
    pub fn merge(&mut self, other: Cart) {
        for item in other.items {
            self.upsert(item);
        }
        self.touch();
    }

    /// Rebinds the cart to an authenticated user. Items are untouched.
    pub fn assign_to_user(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.touch();
    }
}

// Helpers
impl Cart {
    fn position(&self, key: &CartItemKey) -> Option<usize> {
        self.items.iter().position(|item| &item.key() == key)
    }

    fn upsert(&mut self, item: CartItem) {
        match self.position(&item.key()) {
            Some(index) => {
                let existing = &mut self.items[index];
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_QUANTITY);
            }
            None => self.items.push(item),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, price: i64, quantity: i64) -> CartItem {
        CartItem::builder()
            .product_id(product_id)
            .name(format!("Product {product_id}"))
            .unit_price_cents(price)
            .quantity(quantity)
            .creator_slug("studio-lune")
            .build()
            .unwrap()
    }

    fn variant(product_id: &str, variant_id: &str, price: i64) -> CartItem {
        CartItem::builder()
            .product_id(product_id)
            .variant_id(variant_id)
            .name(format!("Product {product_id}"))
            .unit_price_cents(price)
            .creator_slug("studio-lune")
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert!(cart.user_id().is_none());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.total().unwrap().is_zero());
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 2500, 2));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total().unwrap().cents(), 5000);
    }

    #[test]
    fn test_add_same_key_increments_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 2500, 1));
        cart.add_item(item("p1", 2500, 1));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.get_item("p1", None).unwrap().quantity(), 2);
    }

    #[test]
    fn test_variants_are_distinct_lines() {
        let mut cart = Cart::new();
        cart.add_item(variant("p1", "s", 1000));
        cart.add_item(variant("p1", "m", 1000));
        cart.add_item(item("p1", 1000, 1));

        assert_eq!(cart.line_count(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(item("p2", 100, 1));
        cart.add_item(item("p1", 100, 1));
        cart.add_item(item("p2", 100, 1));

        let keys: Vec<_> = cart.items().iter().map(|i| i.key().to_string()).collect();
        assert_eq!(keys, vec!["p2", "p1"]);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.add_item(variant("p1", "red", 1000));

        let removed = cart.remove_item("p1", Some("red")).unwrap();
        assert_eq!(removed.key().as_str(), "p1:red");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_item_fails() {
        let mut cart = Cart::new();
        cart.add_item(variant("p1", "red", 1000));

        let err = cart.remove_item("p1", None).unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound { .. }));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_update_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, 2));

        cart.update_quantity("p1", 5, None).unwrap();
        assert_eq!(cart.get_item("p1", None).unwrap().quantity(), 5);
        assert_eq!(cart.total().unwrap().cents(), 5000);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, 2));
        cart.add_item(item("p2", 500, 1));

        cart.update_quantity("p1", 0, None).unwrap();
        assert!(cart.get_item("p1", None).is_none());
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_update_quantity_zero_on_missing_line_fails_like_remove() {
        let mut cart = Cart::new();
        let err = cart.update_quantity("p1", 0, None).unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound { .. }));
    }

    #[test]
    fn test_update_quantity_negative_fails() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, 2));

        let err = cart.update_quantity("p1", -1, None).unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity { quantity: -1 });
        assert_eq!(cart.get_item("p1", None).unwrap().quantity(), 2);
    }

    #[test]
    fn test_update_quantity_above_line_limit_fails() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, 2));

        let err = cart
            .update_quantity("p1", i64::from(u32::MAX), None)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
        assert_eq!(cart.get_item("p1", None).unwrap().quantity(), 2);
    }

    #[test]
    fn test_increment_is_capped_at_line_limit() {
        let max = i64::from(MAX_QUANTITY);
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, max));
        cart.add_item(item("p1", 1000, max));

        assert_eq!(cart.get_item("p1", None).unwrap().quantity(), MAX_QUANTITY);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let mut line = item("p1", 100, 2);
        line.unit_price = Money::from_cents(i64::MAX);
        let cart = Cart::restore(None, vec![line], Utc::now());
        assert_eq!(cart.total(), Err(CartError::TotalOverflow));
    }

    #[test]
    fn test_update_quantity_missing_line_fails() {
        let mut cart = Cart::new();
        let err = cart.update_quantity("p9", 3, None).unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound { .. }));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, 2));
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total().unwrap().is_zero());
    }

    #[test]
    fn test_merge_folds_items() {
        let mut user_cart = Cart::for_user(UserId::new("u1").unwrap());
        user_cart.add_item(item("p1", 1000, 1));

        let mut guest = Cart::new();
        guest.add_item(item("p1", 1000, 2));
        guest.add_item(item("p2", 400, 1));

        user_cart.merge(guest);

        assert_eq!(user_cart.line_count(), 2);
        assert_eq!(user_cart.get_item("p1", None).unwrap().quantity(), 3);
        assert_eq!(user_cart.get_item("p2", None).unwrap().quantity(), 1);
        assert_eq!(user_cart.total().unwrap().cents(), 3400);
        assert_eq!(user_cart.user_id().unwrap().as_str(), "u1");
    }

    #[test]
    fn test_assign_to_user_keeps_items() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 1000, 1));
        cart.assign_to_user(UserId::new("u1").unwrap());

        assert_eq!(cart.user_id().unwrap().as_str(), "u1");
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_restore_collapses_duplicate_keys() {
        let updated_at = Utc::now() - chrono::Duration::hours(3);
        let cart = Cart::restore(
            UserId::new("u1"),
            vec![item("p1", 1000, 1), item("p1", 1000, 2)],
            updated_at,
        );

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.updated_at(), updated_at);
    }

    #[test]
    fn test_mutation_touches_updated_at() {
        let stale = Utc::now() - chrono::Duration::days(1);
        let mut cart = Cart::restore(None, Vec::new(), stale);
        cart.add_item(item("p1", 100, 1));
        assert!(cart.updated_at() > stale);
    }
}
