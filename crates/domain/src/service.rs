//! Write-side service: product writes, order placement and login.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{OrderStatus, new_id};
use store::{Order, Product, Repository, StoreError};

use crate::credentials::{CredentialVerifier, PlaintextVerifier};
use crate::error::{DomainError, Result};
use crate::params::{
    CreateProductParams, LoginParams, LoginResult, PlaceOrderParams, UpdateProductParams,
};
use crate::token::{JwtTokenService, TokenService};

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Service for state-changing operations.
pub struct CommandService<R, T = JwtTokenService, C = PlaintextVerifier> {
    repo: R,
    tokens: Arc<T>,
    credentials: C,
}

impl<R: Clone, T, C: Clone> Clone for CommandService<R, T, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            tokens: Arc::clone(&self.tokens),
            credentials: self.credentials.clone(),
        }
    }
}

impl<R: Repository, T: TokenService> CommandService<R, T, PlaintextVerifier> {
    /// Creates a service that compares stored passwords verbatim.
    pub fn new(repo: R, tokens: Arc<T>) -> Self {
        Self::with_verifier(repo, tokens, PlaintextVerifier)
    }
}

impl<R, T, C> CommandService<R, T, C>
where
    R: Repository,
    T: TokenService,
    C: CredentialVerifier,
{
    pub fn with_verifier(repo: R, tokens: Arc<T>, credentials: C) -> Self {
        Self {
            repo,
            tokens,
            credentials,
        }
    }

    /// Returns the token service used to sign and verify tokens.
    pub fn tokens(&self) -> &Arc<T> {
        &self.tokens
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, params: CreateProductParams) -> Result<Product> {
        validate_product(&params.name, params.price)?;

        let product = Product {
            id: new_id(),
            name: params.name,
            description: params.description,
            price: params.price,
            in_stock: params.in_stock,
            category: params.category,
        };
        self.repo.create_product(product.clone()).await?;

        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Merges the provided fields into the stored product.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(&self, params: UpdateProductParams) -> Result<Product> {
        let mut product = self.repo.get_product(&params.id).await?;
        params.apply_to(&mut product);
        validate_product(&product.name, product.price)?;

        self.repo.update_product(product.clone()).await?;
        Ok(product)
    }

    /// Prices the known products and stores a pending order.
    ///
    /// Unknown ids are ignored; a repeated id is charged once per occurrence.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(&self, params: PlaceOrderParams) -> Result<Order> {
        if params.product_ids.is_empty() {
            return Err(DomainError::InvalidInput(
                "product IDs cannot be empty".to_string(),
            ));
        }

        let products = self.repo.get_products_by_ids(&params.product_ids).await?;
        if products.is_empty() {
            return Err(DomainError::NotFound(
                "no products found for the given IDs".to_string(),
            ));
        }

        let total = products.iter().map(|p| p.price).sum();
        let order = Order {
            id: new_id(),
            user_id: params.user_id,
            product_ids: params.product_ids,
            total,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        };
        self.repo.create_order(order.clone()).await?;

        metrics::counter!("domain_orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, total = order.total, "order placed");
        Ok(order)
    }

    /// Checks credentials and issues an access and a refresh token.
    #[tracing::instrument(skip(self, params), fields(email = %params.email))]
    pub async fn login(&self, params: LoginParams) -> Result<LoginResult> {
        if params.email.is_empty() || params.password.is_empty() {
            return Err(DomainError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }

        let user = match self.repo.get_user_by_email(&params.email).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                metrics::counter!("domain_logins_total", "outcome" => "rejected").increment(1);
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.credentials.verify(&user, &params.password) {
            metrics::counter!("domain_logins_total", "outcome" => "rejected").increment(1);
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self.tokens.sign(&user.id, user.role, ACCESS_TOKEN_TTL)?;
        let refresh_token = self.tokens.sign(&user.id, user.role, REFRESH_TOKEN_TTL)?;

        metrics::counter!("domain_logins_total", "outcome" => "accepted").increment(1);
        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(LoginResult {
            access_token,
            refresh_token,
            user,
        })
    }
}

fn validate_product(name: &str, price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidInput("name cannot be empty".to_string()));
    }
    if price < 0.0 {
        return Err(DomainError::InvalidInput(
            "price cannot be negative".to_string(),
        ));
    }
    Ok(())
}
