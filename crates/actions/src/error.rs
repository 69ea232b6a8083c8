//! Action-boundary errors.
//!
//! Every failure an action can produce is flattened into [`ActionError`]: a
//! tagged kind plus a human-readable message. Callers branch on the kind
//! (redirect to sign-in on `Unauthorized`, render a missing-page view on
//! `NotFound`) instead of parsing message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_auth::AuthzError;
use bazaar_core::DomainError;
use bazaar_store::RepositoryError;

/// Failure discriminant carried in the outcome envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No identity, identity is not the owner or an admin, or bad credentials.
    Unauthorized,
    /// The repository has no match for the requested resource.
    NotFound,
    /// Malformed input, duplicate name/slug, or a disallowed status transition.
    ValidationFailure,
    /// The persistence or session backend failed.
    RepositoryFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::RepositoryFailure => "repository_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed action.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailure, message)
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RepositoryFailure, message)
    }
}

impl From<DomainError> for ActionError {
    fn from(err: DomainError) -> Self {
        let kind = match &err {
            DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorKind::ValidationFailure,
            DomainError::NotFound => ErrorKind::NotFound,
            DomainError::Unauthorized => ErrorKind::Unauthorized,
            DomainError::Repository(_) => ErrorKind::RepositoryFailure,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<AuthzError> for ActionError {
    fn from(err: AuthzError) -> Self {
        Self::new(ErrorKind::Unauthorized, err.to_string())
    }
}

impl From<RepositoryError> for ActionError {
    fn from(err: RepositoryError) -> Self {
        let kind = match &err {
            RepositoryError::NotFound { .. } => ErrorKind::NotFound,
            RepositoryError::Duplicate { .. } | RepositoryError::InvalidDocument(_) => {
                ErrorKind::ValidationFailure
            }
            RepositoryError::Backend(_) => ErrorKind::RepositoryFailure,
        };
        Self::new(kind, err.to_string())
    }
}
