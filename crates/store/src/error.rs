use domain::OrderNumber;
use thiserror::Error;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An order with this number already exists.
    #[error("Duplicate order number: {0}")]
    DuplicateOrderNumber(OrderNumber),

    /// The slug already belongs to another creator.
    #[error("Duplicate creator slug: {0}")]
    DuplicateCreatorSlug(String),

    /// The cart has more lines than a stored position can index.
    #[error("Cart too large to store: {lines} lines")]
    CartTooLarge { lines: usize },

    /// Only carts bound to a user are persisted.
    #[error("Cannot persist a guest cart")]
    GuestCart,

    /// A stored row no longer satisfies the domain rules.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
