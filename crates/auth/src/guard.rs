use thiserror::Error;

use bazaar_core::UserId;

use crate::User;

/// A resource with a single owning user.
///
/// Implemented by domain types whose mutation is gated on ownership.
pub trait OwnedResource {
    fn owner_id(&self) -> UserId;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthenticated")]
    Anonymous,

    #[error("forbidden: caller does not own this resource")]
    NotOwner,

    #[error("forbidden: administrator role required")]
    NotAdmin,
}

/// Decide whether `identity` may mutate `resource`.
///
/// Pure policy check with no IO and nothing to panic on. Admins may mutate
/// anything; everyone else must own the resource. The check must run before
/// any mutating repository call.
pub fn authorize_mutation(
    identity: Option<&User>,
    resource: &impl OwnedResource,
) -> Result<(), AuthzError> {
    let user = identity.ok_or(AuthzError::Anonymous)?;

    if user.is_admin() || resource.owner_id() == user.id {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

/// Decide whether `identity` may manage admin-scoped resources
/// (e.g. the category catalog).
pub fn authorize_admin(identity: Option<&User>) -> Result<(), AuthzError> {
    let user = identity.ok_or(AuthzError::Anonymous)?;

    if user.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotAdmin)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
