//! Signup, login, and logout against the account directory and session store.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use bazaar_core::{DomainError, DomainResult};

use crate::{
    resolve_identity, AccountDirectory, Role, SessionStore, SessionToken, User, UserAccount,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Fields collected by the signup form.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupFields {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Server-side authentication service.
///
/// Login collapses unknown-email and wrong-password into the same
/// `Unauthorized`, so responses cannot be used to probe which emails have
/// accounts.
pub struct AuthService {
    accounts: Arc<dyn AccountDirectory>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountDirectory>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { accounts, sessions }
    }

    /// Create a buyer account and open a session for it.
    ///
    /// New signups are always buyers; seller and admin accounts are
    /// provisioned out of band via [`AuthService::provision`].
    pub async fn signup(&self, fields: SignupFields) -> DomainResult<(User, SessionToken)> {
        let user = self.provision(fields, Role::Buyer).await?;
        let token = self.sessions.issue(&user).await?;
        info!(user_id = %user.id, "account created");
        Ok((user, token))
    }

    /// Create an account with an explicit role, without opening a session.
    pub async fn provision(&self, fields: SignupFields, role: Role) -> DomainResult<User> {
        if fields.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = User::new(fields.email, fields.name, role)?;
        if self.accounts.find_by_email(&user.email).await?.is_some() {
            return Err(DomainError::validation("email already registered"));
        }

        let password_hash = bcrypt::hash(&fields.password, bcrypt::DEFAULT_COST)
            .map_err(|e| DomainError::repository(format!("password hashing failed: {e}")))?;

        self.accounts
            .insert(UserAccount {
                user: user.clone(),
                password_hash,
            })
            .await?;

        Ok(user)
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<(User, SessionToken)> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            warn!("login rejected: unknown email");
            return Err(DomainError::unauthorized());
        };

        let verified = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| DomainError::repository(format!("password verification failed: {e}")))?;
        if !verified {
            warn!(user_id = %account.user.id, "login rejected: wrong password");
            return Err(DomainError::unauthorized());
        }

        let token = self.sessions.issue(&account.user).await?;
        info!(user_id = %account.user.id, "session opened");
        Ok((account.user, token))
    }

    /// Close the session behind `token`. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &SessionToken) -> DomainResult<()> {
        self.sessions.revoke(token).await?;
        info!("session closed");
        Ok(())
    }

    /// Resolve the identity behind an optional token (see [`resolve_identity`]).
    pub async fn check(&self, token: Option<&str>) -> DomainResult<Option<User>> {
        resolve_identity(token, self.sessions.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryAccountDirectory, InMemorySessionStore};

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryAccountDirectory::new()),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    fn fields(email: &str) -> SignupFields {
        SignupFields {
            email: email.to_string(),
            password: "correct horse".to_string(),
            name: "Someone".to_string(),
        }
    }

    #[tokio::test]
    async fn signup_then_login_roundtrip() {
        let auth = service();

        let Ok((created, _)) = auth.signup(fields("ada@example.com")).await else {
            panic!("expected signup to succeed");
        };
        assert_eq!(created.role, Role::Buyer);

        let Ok((logged_in, token)) = auth.login("ada@example.com", "correct horse").await else {
            panic!("expected login to succeed");
        };
        assert_eq!(logged_in.id, created.id);

        let checked = auth.check(Some(token.as_str())).await;
        assert_eq!(checked, Ok(Some(logged_in)));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_alike() {
        let auth = service();
        let Ok(_) = auth.signup(fields("ada@example.com")).await else {
            panic!("expected signup to succeed");
        };

        let unknown = auth.login("ghost@example.com", "correct horse").await;
        let wrong = auth.login("ada@example.com", "wrong password").await;

        assert_eq!(unknown.unwrap_err(), DomainError::Unauthorized);
        assert_eq!(wrong.unwrap_err(), DomainError::Unauthorized);
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_validation_failure() {
        let auth = service();
        let Ok(_) = auth.signup(fields("ada@example.com")).await else {
            panic!("expected signup to succeed");
        };

        let again = auth.signup(fields("ada@example.com")).await;
        assert!(matches!(again, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_any_account_exists() {
        let auth = service();
        let mut bad = fields("ada@example.com");
        bad.password = "short".to_string();

        let result = auth.signup(bad).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        // Nothing was registered, so the email stays available.
        let Ok(_) = auth.signup(fields("ada@example.com")).await else {
            panic!("expected signup to succeed after rejected attempt");
        };
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let auth = service();
        let Ok((_, token)) = auth.signup(fields("ada@example.com")).await else {
            panic!("expected signup to succeed");
        };

        assert_eq!(auth.logout(&token).await, Ok(()));
        assert_eq!(auth.check(Some(token.as_str())).await, Ok(None));

        // Logging out twice stays a no-op.
        assert_eq!(auth.logout(&token).await, Ok(()));
    }

    #[tokio::test]
    async fn provisioned_role_is_kept() {
        let auth = service();
        let Ok(admin) = auth.provision(fields("root@example.com"), Role::Admin).await else {
            panic!("expected provision to succeed");
        };
        assert_eq!(admin.role, Role::Admin);

        let Ok((logged_in, _)) = auth.login("root@example.com", "correct horse").await else {
            panic!("expected login to succeed");
        };
        assert!(logged_in.is_admin());
    }
}
