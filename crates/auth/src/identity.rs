//! Request-identity resolution.

use bazaar_core::DomainResult;

use crate::{SessionStore, SessionToken, User};

/// Resolve the current identity from an optional request token.
///
/// Absent, empty, and unknown tokens all resolve to `Ok(None)`: anonymous is
/// a state, not a failure. The only error path is a session-store outage,
/// which must not masquerade as "logged out".
pub async fn resolve_identity(
    token: Option<&str>,
    sessions: &dyn SessionStore,
) -> DomainResult<Option<User>> {
    let Some(raw) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    sessions.resolve(&SessionToken::from(raw)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemorySessionStore, Role};

    use async_trait::async_trait;
    use bazaar_core::{DomainError, DomainResult};

    struct BrokenSessionStore;

    #[async_trait]
    impl SessionStore for BrokenSessionStore {
        async fn issue(&self, _user: &User) -> DomainResult<SessionToken> {
            Err(DomainError::repository("session backend down"))
        }

        async fn resolve(&self, _token: &SessionToken) -> DomainResult<Option<User>> {
            Err(DomainError::repository("session backend down"))
        }

        async fn revoke(&self, _token: &SessionToken) -> DomainResult<()> {
            Err(DomainError::repository("session backend down"))
        }
    }

    #[tokio::test]
    async fn missing_token_is_anonymous() {
        let sessions = InMemorySessionStore::new();
        assert_eq!(resolve_identity(None, &sessions).await, Ok(None));
        assert_eq!(resolve_identity(Some(""), &sessions).await, Ok(None));
    }

    #[tokio::test]
    async fn unknown_token_is_anonymous_not_an_error() {
        let sessions = InMemorySessionStore::new();
        assert_eq!(resolve_identity(Some("stale-token"), &sessions).await, Ok(None));
    }

    #[tokio::test]
    async fn live_token_resolves_to_its_user() {
        let sessions = InMemorySessionStore::new();
        let Ok(user) = User::new("ada@example.com", "Ada", Role::Seller) else {
            panic!("expected user creation to succeed");
        };
        let Ok(token) = sessions.issue(&user).await else {
            panic!("expected issue to succeed");
        };

        let resolved = resolve_identity(Some(token.as_str()), &sessions).await;
        assert_eq!(resolved, Ok(Some(user)));
    }

    #[tokio::test]
    async fn store_outage_is_an_error_not_anonymous() {
        let result = resolve_identity(Some("any"), &BrokenSessionStore).await;
        assert!(matches!(result, Err(DomainError::Repository(_))));
    }
}
