//! Field resolvers and the views they produce.
//!
//! Every resolver runs against one request's [`RequestContext`]. Nested order
//! fields go through that request's loaders, so listing many orders costs one
//! product batch and one user batch rather than one lookup per order.

use chrono::{DateTime, Utc};
use common::{OrderStatus, Role};
use domain::{
    CreateProductParams, LoginParams, OrdersParams, PlaceOrderParams, ProductsParams,
    UpdateProductParams,
};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use store::{Order, Product, Repository, User};

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::guard;
use crate::state::AppState;

// -- Views --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: i32,
    pub category: String,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            in_stock: p.in_stock,
            category: p.category,
        }
    }
}

/// A user as shown to clients. Never carries the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub user_id: String,
    pub product_ids: Vec<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Products that still exist, in order-line order.
    pub products: Vec<ProductView>,
    pub user: Option<UserView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserView,
}

// -- Inputs --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub in_stock: i32,
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub in_stock: Option<i32>,
    pub category: Option<String>,
}

// -- Resolver --

/// Resolves queries and mutations for one request.
pub struct Resolver<'a, R> {
    state: &'a AppState<R>,
    ctx: &'a RequestContext<R>,
}

impl<'a, R> Resolver<'a, R>
where
    R: Repository + Clone + 'static,
{
    pub fn new(state: &'a AppState<R>, ctx: &'a RequestContext<R>) -> Self {
        Self { state, ctx }
    }

    pub async fn product(&self, id: &str) -> Result<ProductView, ApiError> {
        Ok(self.state.query.get_product(id).await?.into())
    }

    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<ProductView>, ApiError> {
        let products = self
            .state
            .query
            .get_products(ProductsParams {
                limit: filter.limit,
                offset: filter.offset,
                category: filter.category,
            })
            .await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn order(&self, id: &str) -> Result<OrderView, ApiError> {
        let requester = guard::authenticated(self.ctx)?;
        let order = self.state.query.get_order(id, &requester.user_id).await?;
        self.order_view(order).await
    }

    pub async fn orders(&self, filter: OrderFilter) -> Result<Vec<OrderView>, ApiError> {
        let requester = guard::authenticated(self.ctx)?;
        let orders = self
            .state
            .query
            .get_orders(OrdersParams {
                limit: filter.limit,
                offset: filter.offset,
                user_id: requester.user_id.clone(),
            })
            .await?;
        try_join_all(orders.into_iter().map(|o| self.order_view(o))).await
    }

    pub async fn me(&self) -> Result<UserView, ApiError> {
        let requester = guard::authenticated(self.ctx)?;
        Ok(self.state.query.get_user(&requester.user_id).await?.into())
    }

    pub async fn login(&self, email: String, password: String) -> Result<AuthPayload, ApiError> {
        let result = self
            .state
            .commands
            .login(LoginParams { email, password })
            .await?;
        Ok(AuthPayload {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            user: result.user.into(),
        })
    }

    pub async fn create_product(&self, input: CreateProductInput) -> Result<ProductView, ApiError> {
        guard::has_role(self.ctx, Role::Admin)?;
        let product = self
            .state
            .commands
            .create_product(CreateProductParams {
                name: input.name,
                description: input.description,
                price: input.price,
                in_stock: input.in_stock,
                category: input.category,
            })
            .await?;
        Ok(product.into())
    }

    pub async fn update_product(
        &self,
        id: String,
        input: UpdateProductInput,
    ) -> Result<ProductView, ApiError> {
        guard::has_role(self.ctx, Role::Admin)?;
        let product = self
            .state
            .commands
            .update_product(UpdateProductParams {
                id,
                name: input.name,
                description: input.description,
                price: input.price,
                in_stock: input.in_stock,
                category: input.category,
            })
            .await?;
        Ok(product.into())
    }

    pub async fn place_order(&self, product_ids: Vec<String>) -> Result<OrderView, ApiError> {
        let requester = guard::authenticated(self.ctx)?;
        let order = self
            .state
            .commands
            .place_order(PlaceOrderParams {
                user_id: requester.user_id.clone(),
                product_ids,
            })
            .await?;
        self.order_view(order).await
    }

    /// Resolves an order's `products` and `user` concurrently via the loaders.
    async fn order_view(&self, order: Order) -> Result<OrderView, ApiError> {
        let loaders = &self.ctx.loaders;
        let (products, user) = tokio::join!(
            loaders.products.load_many(&order.product_ids),
            loaders.users.load(order.user_id.clone()),
        );

        Ok(OrderView {
            id: order.id,
            user_id: order.user_id,
            product_ids: order.product_ids,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
            products: products?
                .into_iter()
                .flatten()
                .map(ProductView::from)
                .collect(),
            user: user?.map(UserView::from),
        })
    }
}
