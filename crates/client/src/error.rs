//! Client-side failures.

use thiserror::Error;

use bazaar_actions::ActionError;

/// Everything an auth call can fail with on the client.
///
/// Server-side rejections arrive as [`ActionError`] (the envelope's error
/// object, kind intact), so callers branch on the same taxonomy the API
/// publishes. Transport and protocol failures never reach that taxonomy and
/// get their own variants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Action(#[from] ActionError),
    /// Another login/signup/logout/refresh is still running.
    #[error("an authentication call is already in flight")]
    AlreadyInFlight,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed server response: {0}")]
    Protocol(String),
}

impl ClientError {
    /// True when the server rejected the credentials or session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Action(err) if err.kind == bazaar_actions::ErrorKind::Unauthorized
        )
    }
}
