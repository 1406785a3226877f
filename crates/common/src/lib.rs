//! Identifier types shared across the cart and checkout crates.

mod types;

pub use types::{CreatorId, OrderId, UserId};
