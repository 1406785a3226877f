use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{CreatorId, OrderId, UserId};
use domain::{Cart, NewOrder, OrderNumber};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{CartStore, CreatorDirectory, OrderRecord, OrderStore},
};

fn check(flag: &AtomicBool, what: &str) -> Result<()> {
    if flag.load(Ordering::SeqCst) {
        return Err(StoreError::Unavailable(format!("{what} failed")));
    }
    Ok(())
}

/// In-memory cart store for testing.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
    fail_on_read: Arc<AtomicBool>,
    fail_on_save: Arc<AtomicBool>,
    fail_on_clear: Arc<AtomicBool>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail on reads.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    /// Configures the store to fail on saves.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    /// Configures the store to fail on clears.
    pub fn set_fail_on_clear(&self, fail: bool) {
        self.fail_on_clear.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>> {
        check(&self.fail_on_read, "cart read")?;
        Ok(self.carts.read().await.get(user_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        check(&self.fail_on_save, "cart save")?;
        let user_id = cart.user_id().ok_or(StoreError::GuestCart)?;
        self.carts
            .write()
            .await
            .insert(user_id.clone(), cart.clone());
        Ok(())
    }

    async fn clear(&self, user_id: &UserId) -> Result<()> {
        check(&self.fail_on_clear, "cart clear")?;
        if let Some(cart) = self.carts.write().await.get_mut(user_id) {
            cart.clear();
        }
        Ok(())
    }
}

/// In-memory order store for testing.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<Vec<OrderRecord>>>,
    fail_on_create: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail on order creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.fail_on_create.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns all stored orders in creation order.
    pub async fn orders(&self) -> Vec<OrderRecord> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<OrderRecord> {
        check(&self.fail_on_create, "order insert")?;

        let mut orders = self.orders.write().await;
        // Unique constraint simulation
        if orders
            .iter()
            .any(|r| r.order.order_number == order.order_number)
        {
            return Err(StoreError::DuplicateOrderNumber(order.order_number));
        }

        let record = OrderRecord {
            id: OrderId::new(),
            created_at: Utc::now(),
            order,
        };
        orders.push(record.clone());
        Ok(record)
    }

    async fn find_by_number(&self, order_number: &OrderNumber) -> Result<Option<OrderRecord>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .find(|r| &r.order.order_number == order_number)
            .cloned())
    }
}

/// In-memory creator directory for testing.
#[derive(Clone, Default)]
pub struct InMemoryCreatorDirectory {
    creators: Arc<RwLock<HashMap<String, CreatorId>>>,
    fail_on_lookup: Arc<AtomicBool>,
}

impl InMemoryCreatorDirectory {
    /// Creates a new empty in-memory directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a creator under a storefront slug.
    pub async fn register(&self, slug: impl Into<String>, creator_id: CreatorId) {
        self.creators.write().await.insert(slug.into(), creator_id);
    }

    /// Configures the directory to fail on lookups.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.fail_on_lookup.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CreatorDirectory for InMemoryCreatorDirectory {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CreatorId>> {
        check(&self.fail_on_lookup, "creator lookup")?;
        Ok(self.creators.read().await.get(slug).cloned())
    }
}
