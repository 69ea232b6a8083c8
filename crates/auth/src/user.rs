//! User identity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// A resolved marketplace user.
///
/// This is the public identity record: it carries no credentials and is safe
/// to hand to any layer (sessions, responses, ownership checks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user record, normalizing and validating profile fields.
    ///
    /// Emails are trimmed and lowercased so lookups are case-insensitive.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> DomainResult<Self> {
        let email = email.into().trim().to_lowercase();
        let name = name.into().trim().to_string();

        validate_email(&email)?;
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            name,
            role,
            created_at: Utc::now(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Shape check only (`local@domain`); deliverability is out of scope.
pub(crate) fn validate_email(email: &str) -> DomainResult<()> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };

    if well_formed {
        Ok(())
    } else {
        Err(DomainError::validation(format!("malformed email: {email}")))
    }
}
