//! Account records backing signup and login.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use bazaar_core::{DomainError, DomainResult};

use crate::User;

/// A stored account: the public user record plus its password hash.
///
/// The hash stays inside the auth layer; only `user` ever crosses a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

/// Account lookup and registration.
///
/// Emails are the lookup key and are stored lowercased (`User::new`
/// normalizes); `find_by_email` must match case-insensitively.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<UserAccount>>;

    /// Register a new account. A duplicate email is a validation failure.
    async fn insert(&self, account: UserAccount) -> DomainResult<()>;
}

#[async_trait]
impl<D> AccountDirectory for Arc<D>
where
    D: AccountDirectory + ?Sized,
{
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<UserAccount>> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, account: UserAccount) -> DomainResult<()> {
        (**self).insert(account).await
    }
}

/// In-memory account directory for dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<UserAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| DomainError::repository("account directory lock poisoned"))?;
        Ok(accounts.get(&email.trim().to_lowercase()).cloned())
    }

    async fn insert(&self, account: UserAccount) -> DomainResult<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| DomainError::repository("account directory lock poisoned"))?;

        let key = account.user.email.clone();
        if accounts.contains_key(&key) {
            return Err(DomainError::validation("email already registered"));
        }
        accounts.insert(key, account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn account(email: &str) -> UserAccount {
        let Ok(user) = User::new(email, "Someone", Role::Buyer) else {
            panic!("expected user creation to succeed");
        };
        UserAccount {
            user,
            password_hash: "$2b$faketesthash".to_string(),
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let directory = InMemoryAccountDirectory::new();
        assert_eq!(directory.insert(account("ada@example.com")).await, Ok(()));

        let Ok(Some(found)) = directory.find_by_email("ADA@Example.com").await else {
            panic!("expected account to be found");
        };
        assert_eq!(found.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let directory = InMemoryAccountDirectory::new();
        assert_eq!(directory.insert(account("ada@example.com")).await, Ok(()));

        let result = directory.insert(account("ada@example.com")).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_email_finds_nothing() {
        let directory = InMemoryAccountDirectory::new();
        assert_eq!(directory.find_by_email("ghost@example.com").await, Ok(None));
    }
}
