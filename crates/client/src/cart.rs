//! Cart reconciliation hook.

use async_trait::async_trait;

use bazaar_auth::User;

use crate::error::ClientError;

/// Merges the locally held cart with the server copy once a session opens.
///
/// The controller treats this as best effort: a failed sync is logged and
/// never fails the login or signup that triggered it.
#[async_trait]
pub trait CartSync: Send + Sync {
    async fn sync_with_server(&self, user: &User) -> Result<(), ClientError>;
}

/// Sync for surfaces without a cart.
#[derive(Debug, Default)]
pub struct NoopCartSync;

#[async_trait]
impl CartSync for NoopCartSync {
    async fn sync_with_server(&self, _user: &User) -> Result<(), ClientError> {
        Ok(())
    }
}
