//! Domain error model.

use thiserror::Error;

/// Shorthand for fallible domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a domain operation.
///
/// Every deterministic, caller-addressable failure gets its own variant;
/// collaborator breakage goes through `Repository` so callers can tell an
/// outage apart from a bad request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value broke a domain rule (malformed input, duplicate name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier string did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed resource does not exist.
    #[error("not found")]
    NotFound,

    /// The caller may not perform this operation.
    #[error("unauthorized")]
    Unauthorized,

    /// An external collaborator (repository, session store) failed.
    #[error("repository failure: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
