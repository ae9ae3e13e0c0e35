use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Role, new_id};
use tokio::sync::RwLock;

use crate::{
    Collection, Order, OrderQuery, Product, ProductQuery, Result, StoreError, User,
    store::Repository,
};

/// The three maps guarded as one unit.
#[derive(Debug, Default)]
pub(crate) struct Collections {
    pub(crate) users: HashMap<String, User>,
    pub(crate) products: HashMap<String, Product>,
    pub(crate) orders: HashMap<String, Order>,
}

/// In-memory store shared by every request.
///
/// A single reader-writer lock guards all collections: reads run
/// concurrently, any write excludes everyone else for its duration.
/// Cloning is cheap and clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub(crate) inner: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding only the default seed users.
    pub fn seeded() -> Self {
        Self::from_collections(Collections {
            users: seed_users(),
            ..Default::default()
        })
    }

    pub(crate) fn from_collections(collections: Collections) -> Self {
        Self {
            inner: Arc::new(RwLock::new(collections)),
        }
    }

    /// Inserts a user, replacing any user with the same id.
    ///
    /// Only used for fixtures; the service has no user-creation path.
    pub async fn insert_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id.clone(), user);
    }

    /// Returns the number of records in each collection as
    /// `(users, products, orders)`.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let state = self.inner.read().await;
        (state.users.len(), state.products.len(), state.orders.len())
    }
}

/// Users materialized when no user snapshot exists.
pub(crate) fn seed_users() -> HashMap<String, User> {
    let admin = User {
        id: new_id(),
        role: Role::Admin,
        name: "Admin User".to_string(),
        email: "admin@example.com".to_string(),
        password: "secret".to_string(),
    };
    let customer = User {
        id: new_id(),
        role: Role::Customer,
        name: "Customer User".to_string(),
        email: "customer@example.com".to_string(),
        password: "secret".to_string(),
    };

    [admin, customer]
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect()
}

#[async_trait]
impl Repository for InMemoryStore {
    async fn get_user(&self, id: &str) -> Result<User> {
        let state = self.inner.read().await;
        state
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Collection::Users, id))
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let state = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let state = self.inner.read().await;
        state
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Collection::Users, email))
    }

    async fn get_product(&self, id: &str) -> Result<Product> {
        let state = self.inner.read().await;
        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Collection::Products, id))
    }

    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>> {
        let state = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self, query: ProductQuery) -> Result<Vec<Product>> {
        let state = self.inner.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| query.matches_category(&p.category))
            .cloned()
            .collect();
        drop(state);

        // Map iteration order is arbitrary; sort so pages are stable.
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(query.page.slice(products))
    }

    async fn create_product(&self, product: Product) -> Result<()> {
        let mut state = self.inner.write().await;
        if state.products.contains_key(&product.id) {
            return Err(StoreError::already_exists(Collection::Products, product.id));
        }
        state.products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        let mut state = self.inner.write().await;
        match state.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product;
                Ok(())
            }
            None => Err(StoreError::not_found(Collection::Products, product.id)),
        }
    }

    async fn create_order(&self, order: Order) -> Result<()> {
        let mut state = self.inner.write().await;
        if state.orders.contains_key(&order.id) {
            return Err(StoreError::already_exists(Collection::Orders, order.id));
        }
        state.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get_order(&self, id: &str) -> Result<Order> {
        let state = self.inner.read().await;
        state
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Collection::Orders, id))
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let state = self.inner.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.user_id == query.user_id)
            .cloned()
            .collect();
        drop(state);

        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(query.page.slice(orders))
    }
}
