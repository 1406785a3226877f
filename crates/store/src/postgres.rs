use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CreatorId, OrderId, UserId};
use domain::{
    Cart, CartItem, Money, NewOrder, OrderNumber, OrderStatus, ShippingAddress, ShippingMode,
    VariantInfo,
};
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{CartStore, CreatorDirectory, OrderRecord, OrderStore},
};

/// PostgreSQL-backed store for carts, orders and creators.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts or renames a creator.
    ///
    /// Fails with `DuplicateCreatorSlug` if another creator owns `slug`.
    pub async fn register_creator(
        &self,
        creator_id: &CreatorId,
        slug: &str,
        display_name: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO creators (id, slug, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                slug = EXCLUDED.slug,
                display_name = EXCLUDED.display_name
            "#,
        )
        .bind(creator_id.as_str())
        .bind(slug)
        .bind(display_name)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_creator_slug")
            {
                return StoreError::DuplicateCreatorSlug(slug.to_string());
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    fn row_to_cart_item(row: &PgRow) -> Result<CartItem> {
        let mut builder = CartItem::builder()
            .product_id(row.try_get::<String, _>("product_id")?)
            .name(row.try_get::<String, _>("name")?)
            .unit_price_cents(row.try_get("unit_price_cents")?)
            .quantity(row.try_get("quantity")?)
            .creator_slug(row.try_get::<String, _>("creator_slug")?);

        if let Some(variant_id) = row.try_get::<Option<String>, _>("variant_id")? {
            builder = builder.variant_id(variant_id);
        }
        if let Some(image) = row.try_get::<Option<String>, _>("image")? {
            builder = builder.image(image);
        }
        if let Some(Json(info)) = row.try_get::<Option<Json<VariantInfo>>, _>("variant_info")? {
            builder = builder.variant_info(info);
        }

        builder
            .build()
            .map_err(|e| StoreError::CorruptRecord(format!("cart item: {e}")))
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        let corrupt = |field: &str, value: &str| {
            StoreError::CorruptRecord(format!("order {field}: {value}"))
        };

        let number: String = row.try_get("order_number")?;
        let order_number = OrderNumber::parse(&number).map_err(|_| corrupt("number", &number))?;

        let status: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status).ok_or_else(|| corrupt("status", &status))?;

        let mode: String = row.try_get("shipping_mode")?;
        let shipping_mode =
            ShippingMode::parse(&mode).ok_or_else(|| corrupt("shipping mode", &mode))?;

        let customer: String = row.try_get("customer_id")?;
        let customer_id =
            UserId::new(customer.as_str()).ok_or_else(|| corrupt("customer", &customer))?;

        let order = NewOrder {
            order_number,
            creator_id: CreatorId::new(row.try_get::<String, _>("creator_id")?),
            customer_id,
            customer_email: row.try_get("customer_email")?,
            status,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            shipping_address: ShippingAddress {
                first_name: row.try_get("shipping_first_name")?,
                last_name: row.try_get("shipping_last_name")?,
                street: row.try_get("shipping_street")?,
                complement: row.try_get("shipping_complement")?,
                city: row.try_get("shipping_city")?,
                postal_code: row.try_get("shipping_postal_code")?,
                country: row.try_get("shipping_country")?,
                phone: row.try_get("shipping_phone")?,
            },
            shipping_mode,
            relay_point_id: row.try_get("relay_point_id")?,
            relay_point_name: row.try_get("relay_point_name")?,
            shipping_cost: Money::from_cents(row.try_get("shipping_cost_cents")?),
            carrier: row.try_get("carrier")?,
            payment_reference: row.try_get("payment_reference")?,
        };

        Ok(OrderRecord {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            order,
        })
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>> {
        let updated_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM carts WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        let Some(updated_at) = updated_at else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT product_id, variant_id, name, unit_price_cents, quantity, image, variant_info, creator_slug
            FROM cart_items
            WHERE user_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(Self::row_to_cart_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Cart::restore(Some(user_id.clone()), items, updated_at)))
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let user_id = cart.user_id().ok_or(StoreError::GuestCart)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, updated_at)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(cart.updated_at())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&mut *tx)
            .await?;

        for (position, item) in cart.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (user_id, position, product_id, variant_id, name, unit_price_cents, quantity, image, variant_info, creator_slug)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(user_id.as_str())
            .bind(line_position(position, cart.line_count())?)
            .bind(item.product_id().as_str())
            .bind(item.variant_id())
            .bind(item.name())
            .bind(item.unit_price().cents())
            .bind(i64::from(item.quantity()))
            .bind(item.image())
            .bind(item.variant_info().map(Json))
            .bind(item.creator_slug())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, user_id: &UserId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create(&self, order: NewOrder) -> Result<OrderRecord> {
        let id = OrderId::new();
        let address = &order.shipping_address;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                id, order_number, creator_id, customer_id, customer_email, status,
                total_amount_cents, shipping_first_name, shipping_last_name, shipping_street,
                shipping_complement, shipping_city, shipping_postal_code, shipping_country,
                shipping_phone, shipping_mode, relay_point_id, relay_point_name,
                shipping_cost_cents, carrier, payment_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            RETURNING created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(order.order_number.as_str())
        .bind(order.creator_id.as_str())
        .bind(order.customer_id.as_str())
        .bind(&order.customer_email)
        .bind(order.status.as_str())
        .bind(order.total_amount.cents())
        .bind(&address.first_name)
        .bind(&address.last_name)
        .bind(&address.street)
        .bind(address.complement.as_deref())
        .bind(&address.city)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.phone.as_deref())
        .bind(order.shipping_mode.as_str())
        .bind(order.relay_point_id.as_deref())
        .bind(order.relay_point_name.as_deref())
        .bind(order.shipping_cost.cents())
        .bind(&order.carrier)
        .bind(&order.payment_reference)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_order_number")
            {
                return StoreError::DuplicateOrderNumber(order.order_number.clone());
            }
            StoreError::Database(e)
        })?;

        tracing::debug!(order_number = %order.order_number, %id, "order inserted");

        Ok(OrderRecord {
            id,
            created_at,
            order,
        })
    }

    async fn find_by_number(&self, order_number: &OrderNumber) -> Result<Option<OrderRecord>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, order_number, creator_id, customer_id, customer_email, status,
                   total_amount_cents, shipping_first_name, shipping_last_name, shipping_street,
                   shipping_complement, shipping_city, shipping_postal_code, shipping_country,
                   shipping_phone, shipping_mode, relay_point_id, relay_point_name,
                   shipping_cost_cents, carrier, payment_reference, created_at
            FROM orders
            WHERE order_number = $1
            "#,
        )
        .bind(order_number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }
}

#[async_trait]
impl CreatorDirectory for PostgresStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CreatorId>> {
        let id: Option<String> = sqlx::query_scalar("SELECT id FROM creators WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(CreatorId::new))
    }
}

fn line_position(index: usize, lines: usize) -> Result<i32> {
    i32::try_from(index).map_err(|_| StoreError::CartTooLarge { lines })
}
