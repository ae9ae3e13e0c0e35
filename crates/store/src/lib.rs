pub mod entity;
pub mod error;
pub mod memory;
pub mod query;
pub mod snapshot;
pub mod store;

pub use entity::{Collection, Order, Product, User};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use query::{OrderQuery, ProductQuery};
pub use snapshot::{MIN_PERSIST_INTERVAL, SnapshotReport, StoreConfig};
pub use store::Repository;
