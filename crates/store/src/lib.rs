//! Persistence for carts, pending orders and the creator directory.
//!
//! Each concern is a trait with an in-memory implementation for tests and
//! local runs, and a PostgreSQL implementation for production.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryCartStore, InMemoryCreatorDirectory, InMemoryOrderStore};
pub use postgres::PostgresStore;
pub use store::{CartStore, CreatorDirectory, OrderRecord, OrderStore};
