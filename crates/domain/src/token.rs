//! Signed tokens bound to a user id and role.

use std::time::Duration;

use chrono::Utc;
use common::Role;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuer written into and required from every token.
pub const ISSUER: &str = "graphql-backend";

/// Audience written into and required from every token.
pub const AUDIENCE: &str = "graphql-ecommerce-client";

/// Claims carried by issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Not before (Unix timestamp).
    pub nbf: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Issues and checks tokens.
pub trait TokenService: Send + Sync {
    /// Signs a token for `subject` valid for `ttl` from now.
    fn sign(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, TokenError>;

    /// Checks signature, expiry, not-before, issuer and audience.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 tokens signed with a shared secret.
///
/// Issuer and verifier hold the same symmetric key. Tokens carry no `kid`
/// header and there is no RS256 key set to rotate through.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[ISSUER]);
        validation.validate_nbf = true;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Signing)
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService").finish_non_exhaustive()
    }
}

impl TokenService for JwtTokenService {
    fn sign(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.as_secs() as i64,
        };
        self.encode(&claims)
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtTokenService {
        JwtTokenService::new(b"test-secret")
    }

    #[test]
    fn signed_token_verifies() {
        let tokens = service();
        let token = tokens
            .sign("u1", Role::Admin, Duration::from_secs(60))
            .unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn tokens_use_symmetric_header_without_key_id() {
        let token = service()
            .sign("u1", Role::Customer, Duration::from_secs(60))
            .unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert!(header.kid.is_none());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtTokenService::new(b"other-secret")
            .sign("u1", Role::Customer, Duration::from_secs(60))
            .unwrap();

        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens
            .encode(&Claims {
                sub: "u1".to_string(),
                role: Role::Customer,
                iss: ISSUER.to_string(),
                aud: AUDIENCE.to_string(),
                iat: now - 7200,
                nbf: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens
            .encode(&Claims {
                sub: "u1".to_string(),
                role: Role::Customer,
                iss: ISSUER.to_string(),
                aud: "someone-else".to_string(),
                iat: now,
                nbf: now,
                exp: now + 60,
            })
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service().verify("not.a.token").is_err());
    }
}
