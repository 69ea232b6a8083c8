//! The single-slot identity cache.

use bazaar_auth::User;

/// Where the client currently stands on "who is signed in".
///
/// `Unresolved` is the state before the first resolution call of a page
/// lifetime. `Resolving` is transient while an auth call is in flight; the
/// controller guarantees it never survives a completed call. The two terminal
/// states are re-entered only through explicit login/signup/logout/refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Unresolved,
    Resolving,
    Authenticated(User),
    Anonymous,
}

impl AuthPhase {
    /// The signed-in user, when there is one.
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthPhase::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// True while an auth call is in flight (UI loading indicator).
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthPhase::Resolving)
    }

    /// True once identity is known, one way or the other.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthPhase::Authenticated(_) | AuthPhase::Anonymous)
    }
}
