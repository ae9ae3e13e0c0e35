//! Query and command services for the storefront backend.
//!
//! This crate provides:
//! - [`QueryService`] for reads with pagination defaults and ownership checks
//! - [`CommandService`] for product writes, order placement and login
//! - [`TokenService`] with a JWT implementation for issuing access tokens
//! - [`CredentialVerifier`] for checking a login password against a user

pub mod credentials;
pub mod error;
pub mod params;
pub mod query;
pub mod service;
pub mod token;

pub use credentials::{CredentialVerifier, PlaintextVerifier};
pub use error::{DomainError, Result};
pub use params::{
    CreateProductParams, LoginParams, LoginResult, OrdersParams, PlaceOrderParams,
    ProductsParams, UpdateProductParams,
};
pub use query::QueryService;
pub use service::{ACCESS_TOKEN_TTL, CommandService, REFRESH_TOKEN_TTL};
pub use token::{AUDIENCE, Claims, ISSUER, JwtTokenService, TokenError, TokenService};
