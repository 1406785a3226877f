use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CreatorId, OrderId, UserId};
use domain::{Cart, NewOrder, OrderNumber};

use crate::Result;

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub order: NewOrder,
}

/// Authoritative storage of per-user carts.
///
/// Guest carts live on the client and are never stored here.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the cart of a user. Returns None if the user has no stored cart.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>>;

    /// Replaces the stored cart of the cart's owner.
    ///
    /// Fails with `GuestCart` if the cart has no owner.
    async fn save(&self, cart: &Cart) -> Result<()>;

    /// Removes every line from the user's stored cart.
    async fn clear(&self, user_id: &UserId) -> Result<()>;
}

/// Storage of orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    ///
    /// Fails with `DuplicateOrderNumber` if the number is already taken.
    /// There is no retry with a fresh number.
    async fn create(&self, order: NewOrder) -> Result<OrderRecord>;

    /// Looks an order up by its order number.
    async fn find_by_number(&self, order_number: &OrderNumber) -> Result<Option<OrderRecord>>;
}

/// Read access to creator accounts.
#[async_trait]
pub trait CreatorDirectory: Send + Sync {
    /// Resolves a storefront slug to a creator.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CreatorId>>;
}

// Blanket implementations so shared `Arc<dyn ...>` handles can be used
// wherever a store is expected.

#[async_trait]
impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>> {
        (**self).find_by_user(user_id).await
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        (**self).save(cart).await
    }

    async fn clear(&self, user_id: &UserId) -> Result<()> {
        (**self).clear(user_id).await
    }
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn create(&self, order: NewOrder) -> Result<OrderRecord> {
        (**self).create(order).await
    }

    async fn find_by_number(&self, order_number: &OrderNumber) -> Result<Option<OrderRecord>> {
        (**self).find_by_number(order_number).await
    }
}

#[async_trait]
impl<T: CreatorDirectory + ?Sized> CreatorDirectory for Arc<T> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CreatorId>> {
        (**self).find_by_slug(slug).await
    }
}
