//! Request-scoped loaders for users and products.

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{DomainError, QueryService};
use loader::{BatchFn, Loader, LoaderConfig};
use store::{Product, Repository, User};

/// Fetches users by id through the query service.
pub struct UserBatch<R> {
    query: QueryService<R>,
}

#[async_trait]
impl<R> BatchFn<String, User> for UserBatch<R>
where
    R: Repository + Clone + 'static,
{
    type Error = DomainError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, User>, DomainError> {
        let users = self.query.get_users_by_ids(keys).await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }
}

/// Fetches products by id through the query service.
pub struct ProductBatch<R> {
    query: QueryService<R>,
}

#[async_trait]
impl<R> BatchFn<String, Product> for ProductBatch<R>
where
    R: Repository + Clone + 'static,
{
    type Error = DomainError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Product>, DomainError> {
        let products = self.query.get_products_by_ids(keys).await?;
        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

pub type UserLoader<R> = Loader<String, User, UserBatch<R>>;
pub type ProductLoader<R> = Loader<String, Product, ProductBatch<R>>;

/// The loaders of one request. Clones share caches.
pub struct Loaders<R> {
    pub users: UserLoader<R>,
    pub products: ProductLoader<R>,
}

impl<R> Clone for Loaders<R> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            products: self.products.clone(),
        }
    }
}

impl<R> Loaders<R>
where
    R: Repository + Clone + 'static,
{
    /// Creates fresh loaders with empty caches.
    pub fn new(query: QueryService<R>, config: &LoaderConfig) -> Self {
        Self {
            users: Loader::new(
                "users",
                UserBatch {
                    query: query.clone(),
                },
                config.clone(),
            ),
            products: Loader::new("products", ProductBatch { query }, config.clone()),
        }
    }
}
