//! Shared primitives used across the storefront crates.

pub mod page;
pub mod types;

pub use page::{DEFAULT_LIMIT, Page};
pub use types::{OrderStatus, Role, new_id};
