use async_trait::async_trait;

use crate::{Order, OrderQuery, Product, ProductQuery, Result, User};

/// Core trait for the storefront's authoritative state.
///
/// Implementations must be thread-safe (Send + Sync). Every method is a
/// single critical section; no transaction spans two calls.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Retrieves a user by id.
    async fn get_user(&self, id: &str) -> Result<User>;

    /// Retrieves the users whose ids are known.
    ///
    /// Unknown ids are skipped; this never fails because of a missing id.
    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    /// Retrieves the first user with the given email.
    async fn get_user_by_email(&self, email: &str) -> Result<User>;

    /// Retrieves a product by id.
    async fn get_product(&self, id: &str) -> Result<Product>;

    /// Retrieves one product per known input id, in input order.
    ///
    /// Unknown ids are skipped. Repeated ids produce repeated entries.
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>>;

    /// Lists products matching the query.
    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>>;

    /// Inserts a new product. Fails with `AlreadyExists` on an id clash.
    async fn create_product(&self, product: Product) -> Result<()>;

    /// Replaces an existing product. Fails with `NotFound` if absent.
    async fn update_product(&self, product: Product) -> Result<()>;

    /// Inserts a new order. Fails with `AlreadyExists` on an id clash.
    async fn create_order(&self, order: Order) -> Result<()>;

    /// Retrieves an order by id.
    async fn get_order(&self, id: &str) -> Result<Order>;

    /// Lists the orders owned by `query.user_id`.
    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>>;
}
