//! Authorization checks applied by resolvers.

use common::Role;
use domain::DomainError;

use crate::context::{Identity, RequestContext};

/// Returns the caller's identity, or `Unauthorized` for anonymous requests.
pub fn authenticated<R>(ctx: &RequestContext<R>) -> Result<&Identity, DomainError> {
    ctx.identity.as_ref().ok_or(DomainError::Unauthorized)
}

/// Requires an identity holding `role`.
pub fn has_role<R>(ctx: &RequestContext<R>, role: Role) -> Result<&Identity, DomainError> {
    let identity = authenticated(ctx)?;
    if identity.role != role {
        tracing::debug!(user_id = %identity.user_id, required = %role, "role check failed");
        return Err(DomainError::Forbidden { required: role });
    }
    Ok(identity)
}
