//! Read-side service.

use store::{Order, Product, Repository, User};

use crate::error::{DomainError, Result};
use crate::params::{OrdersParams, ProductsParams};

/// Stateless read façade over a [`Repository`].
///
/// Applies pagination defaults and hides orders from anyone but their owner.
#[derive(Debug, Clone)]
pub struct QueryService<R> {
    repo: R,
}

impl<R: Repository> QueryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product> {
        Ok(self.repo.get_product(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_products(&self, params: ProductsParams) -> Result<Vec<Product>> {
        Ok(self.repo.list_products(params.into_query()).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_orders(&self, params: OrdersParams) -> Result<Vec<Order>> {
        Ok(self.repo.list_orders(params.into_query()).await?)
    }

    /// Loads an order owned by `requester_id`.
    ///
    /// Someone else's order is reported exactly like a missing one.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: &str, requester_id: &str) -> Result<Order> {
        let order = self.repo.get_order(id).await?;
        if order.user_id != requester_id {
            return Err(DomainError::NotFound(format!("order not found: {id}")));
        }
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<User> {
        Ok(self.repo.get_user(id).await?)
    }

    /// Batch read for loaders; unknown ids are skipped.
    pub async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        Ok(self.repo.get_users_by_ids(ids).await?)
    }

    /// Batch read for loaders; unknown ids are skipped.
    pub async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>> {
        Ok(self.repo.get_products_by_ids(ids).await?)
    }
}
