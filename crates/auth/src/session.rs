//! Opaque session tokens and the session store boundary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::{DomainError, DomainResult};

use crate::User;

/// Opaque session token handed to clients.
///
/// Tokens are random (UUIDv4-backed) and carry no claims; they mean nothing
/// outside the store that issued them. Random rather than time-ordered so a
/// token does not reveal when the session was opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identity store.
///
/// ## Resolution Semantics
///
/// `resolve` returns `Ok(None)` for any token the store does not currently
/// hold; expired, revoked, and never-issued tokens are indistinguishable.
/// Errors are reserved for backend failures (lost connection, poisoned
/// lock); callers treat them as outages, not as authentication answers.
///
/// ## Revocation Semantics
///
/// `revoke` of an unknown token succeeds: the desired end state (token not
/// resolvable) already holds.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a session for `user` and return its token.
    async fn issue(&self, user: &User) -> DomainResult<SessionToken>;

    /// Resolve a token to the user it was issued for, if the session is live.
    async fn resolve(&self, token: &SessionToken) -> DomainResult<Option<User>>;

    /// Close the session behind `token`.
    async fn revoke(&self, token: &SessionToken) -> DomainResult<()>;
}

#[async_trait]
impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    async fn issue(&self, user: &User) -> DomainResult<SessionToken> {
        (**self).issue(user).await
    }

    async fn resolve(&self, token: &SessionToken) -> DomainResult<Option<User>> {
        (**self).resolve(token).await
    }

    async fn revoke(&self, token: &SessionToken) -> DomainResult<()> {
        (**self).revoke(token).await
    }
}

/// In-memory session store.
///
/// Intended for tests/dev. Sessions live until revoked or process exit.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, User>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn issue(&self, user: &User) -> DomainResult<SessionToken> {
        let token = SessionToken::generate();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| DomainError::repository("session store lock poisoned"))?;
        sessions.insert(token.as_str().to_string(), user.clone());
        Ok(token)
    }

    async fn resolve(&self, token: &SessionToken) -> DomainResult<Option<User>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| DomainError::repository("session store lock poisoned"))?;
        Ok(sessions.get(token.as_str()).cloned())
    }

    async fn revoke(&self, token: &SessionToken) -> DomainResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| DomainError::repository("session store lock poisoned"))?;
        sessions.remove(token.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn buyer() -> User {
        let Ok(user) = User::new("buyer@example.com", "Buyer", Role::Buyer) else {
            panic!("expected user creation to succeed");
        };
        user
    }

    #[tokio::test]
    async fn issued_token_resolves_to_its_user() {
        let store = InMemorySessionStore::new();
        let user = buyer();

        let Ok(token) = store.issue(&user).await else {
            panic!("expected issue to succeed");
        };
        let resolved = store.resolve(&token).await;
        assert_eq!(resolved, Ok(Some(user)));
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let store = InMemorySessionStore::new();
        let resolved = store.resolve(&SessionToken::from("nope")).await;
        assert_eq!(resolved, Ok(None));
    }

    #[tokio::test]
    async fn revoked_token_no_longer_resolves() {
        let store = InMemorySessionStore::new();
        let user = buyer();

        let Ok(token) = store.issue(&user).await else {
            panic!("expected issue to succeed");
        };
        assert_eq!(store.revoke(&token).await, Ok(()));
        assert_eq!(store.resolve(&token).await, Ok(None));
    }

    #[tokio::test]
    async fn revoking_unknown_token_is_a_noop() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.revoke(&SessionToken::from("nope")).await, Ok(()));
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_tokens() {
        let store = InMemorySessionStore::new();
        let user = buyer();

        let (Ok(a), Ok(b)) = (store.issue(&user).await, store.issue(&user).await) else {
            panic!("expected both issues to succeed");
        };
        assert_ne!(a, b);
    }
}
