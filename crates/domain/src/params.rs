//! Inputs and outputs of the query and command services.

use common::Page;
use store::{OrderQuery, Product, ProductQuery, User};

/// Product listing input as received from a client.
#[derive(Debug, Clone, Default)]
pub struct ProductsParams {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    pub category: Option<String>,
}

impl ProductsParams {
    /// Applies defaults and builds the store query.
    pub fn into_query(self) -> ProductQuery {
        ProductQuery {
            category: self.category,
            page: Page::from_params(self.limit, self.offset),
        }
    }
}

/// Order listing input; `user_id` is the authenticated requester.
#[derive(Debug, Clone, Default)]
pub struct OrdersParams {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    pub user_id: String,
}

impl OrdersParams {
    /// Applies defaults and builds the store query.
    pub fn into_query(self) -> OrderQuery {
        OrderQuery::for_user(self.user_id).page(Page::from_params(self.limit, self.offset))
    }
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: i32,
    pub category: String,
}

/// Partial product update. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductParams {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub in_stock: Option<i32>,
    pub category: Option<String>,
}

impl UpdateProductParams {
    /// Overwrites the fields that were provided.
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceOrderParams {
    pub user_id: String,
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

/// Tokens issued by a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}
