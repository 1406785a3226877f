//! Server-side cart maintenance.

use common::UserId;
use domain::{Cart, CartItem};
use store::CartStore;

use crate::error::CartServiceError;

/// Service for managing the authoritative cart of signed-in users.
///
/// Every mutation loads the stored cart, applies the change to the aggregate
/// and saves the result. A user without a stored cart starts from an empty one.
pub struct CartService<C: CartStore> {
    carts: C,
}

impl<C: CartStore> CartService<C> {
    /// Creates a new cart service over the given store.
    pub fn new(carts: C) -> Self {
        Self { carts }
    }

    /// Returns the user's cart, empty if none is stored.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Cart, CartServiceError> {
        Ok(self
            .carts
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| Cart::for_user(user_id.clone())))
    }

    /// Adds an item, incrementing the line with the same key if present.
    #[tracing::instrument(skip(self, item), fields(key = %item.key()))]
    pub async fn add_item(
        &self,
        user_id: &UserId,
        item: CartItem,
    ) -> Result<Cart, CartServiceError> {
        self.mutate(user_id, "add_item", |cart| {
            cart.add_item(item);
            Ok(())
        })
        .await
    }

    /// Overwrites the quantity of a line; 0 removes it.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: &UserId,
        product_id: &str,
        quantity: i64,
        variant_id: Option<&str>,
    ) -> Result<Cart, CartServiceError> {
        self.mutate(user_id, "update_quantity", |cart| {
            cart.update_quantity(product_id, quantity, variant_id)
        })
        .await
    }

    /// Removes a line.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> Result<Cart, CartServiceError> {
        self.mutate(user_id, "remove_item", |cart| {
            cart.remove_item(product_id, variant_id).map(|_| ())
        })
        .await
    }

    /// Empties the cart.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: &UserId) -> Result<Cart, CartServiceError> {
        self.mutate(user_id, "clear", |cart| {
            cart.clear();
            Ok(())
        })
        .await
    }

    /// Folds a guest cart into the user's cart after sign-in.
    #[tracing::instrument(skip(self, guest), fields(guest_lines = guest.line_count()))]
    pub async fn merge_guest_cart(
        &self,
        user_id: &UserId,
        guest: Cart,
    ) -> Result<Cart, CartServiceError> {
        self.mutate(user_id, "merge", |cart| {
            cart.merge(guest);
            Ok(())
        })
        .await
    }

    async fn mutate<F>(
        &self,
        user_id: &UserId,
        op: &'static str,
        change: F,
    ) -> Result<Cart, CartServiceError>
    where
        F: FnOnce(&mut Cart) -> Result<(), domain::CartError>,
    {
        let mut cart = self.get_cart(user_id).await?;
        if cart.user_id() != Some(user_id) {
            cart.assign_to_user(user_id.clone());
        }

        change(&mut cart)?;
        self.carts.save(&cart).await?;

        metrics::counter!("cart_mutations_total", "op" => op).increment(1);
        tracing::debug!(op, lines = cart.line_count(), "cart updated");
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use domain::CartError;
    use store::{InMemoryCartStore, StoreError};

    use super::*;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

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

    #[tokio::test]
    async fn test_get_cart_without_stored_cart() {
        let service = CartService::new(InMemoryCartStore::new());

        let cart = service.get_cart(&user()).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.user_id(), Some(&user()));
    }

    #[tokio::test]
    async fn test_add_item_persists() {
        let store = InMemoryCartStore::new();
        let service = CartService::new(store.clone());

        service.add_item(&user(), item("p1", 2500, 1)).await.unwrap();
        service.add_item(&user(), item("p1", 2500, 1)).await.unwrap();

        let stored = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored.line_count(), 1);
        assert_eq!(stored.item_count(), 2);
        assert_eq!(stored.total().unwrap().cents(), 5000);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes() {
        let service = CartService::new(InMemoryCartStore::new());
        service.add_item(&user(), item("p1", 1000, 2)).await.unwrap();

        let cart = service.update_quantity(&user(), "p1", 0, None).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_item_is_cart_error() {
        let store = InMemoryCartStore::new();
        let service = CartService::new(store.clone());

        let err = service.remove_item(&user(), "p9", None).await.unwrap_err();
        assert!(matches!(
            err,
            CartServiceError::Cart(CartError::ItemNotFound { .. })
        ));
        assert_eq!(store.cart_count().await, 0);
    }

    #[tokio::test]
    async fn test_merge_guest_cart() {
        let service = CartService::new(InMemoryCartStore::new());
        service.add_item(&user(), item("p1", 1000, 1)).await.unwrap();

        let mut guest = Cart::new();
        guest.add_item(item("p1", 1000, 2));
        guest.add_item(item("p2", 400, 1));

        let cart = service.merge_guest_cart(&user(), guest).await.unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.get_item("p1", None).unwrap().quantity(), 3);
        assert_eq!(cart.total().unwrap().cents(), 3400);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryCartStore::new();
        let service = CartService::new(store.clone());
        service.add_item(&user(), item("p1", 1000, 1)).await.unwrap();

        service.clear(&user()).await.unwrap();
        assert!(store.find_by_user(&user()).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_is_store_error() {
        let store = InMemoryCartStore::new();
        store.set_fail_on_save(true);
        let service = CartService::new(store);

        let err = service
            .add_item(&user(), item("p1", 1000, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartServiceError::Store(StoreError::Unavailable(_))
        ));
    }
}
