//! Cache revalidation signals.
//!
//! Write operations that change publicly cached reads publish the affected
//! path here. Subscribers (the HTTP revalidation stream, the optional Redis
//! bridge) fan the signal out to whatever holds the cache.
//!
//! Delivery is best-effort. Publishing with no subscribers is not an error,
//! and a slow subscriber can miss signals (`Lagged`). Callers publish only
//! after the underlying write has succeeded, so a delivered signal always
//! refers to committed data.

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisRevalidationBus, RedisRevalidationError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// A single revalidation signal: this path's cached representation is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revalidation {
    pub path: String,
    pub occurred_at: DateTime<Utc>,
}

impl Revalidation {
    pub fn now(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// In-process broadcast channel for revalidation signals.
///
/// Cloning is cheap; clones publish into and subscribe to the same channel.
#[derive(Debug, Clone)]
pub struct RevalidationChannel {
    sender: broadcast::Sender<Revalidation>,
}

impl RevalidationChannel {
    /// Create a channel that buffers up to `capacity` signals per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a revalidation for `path`.
    ///
    /// Returns the number of subscribers the signal reached. Zero subscribers
    /// is fine; the signal is simply dropped.
    pub fn publish(&self, path: impl Into<String>) -> usize {
        let revalidation = Revalidation::now(path);
        let delivered = self
            .sender
            .send(revalidation.clone())
            .map_or(0, |subscribers| subscribers);
        debug!(path = %revalidation.path, subscribers = delivered, "published revalidation");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Revalidation> {
        self.sender.subscribe()
    }
}

impl Default for RevalidationChannel {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_reaches_nobody() {
        let channel = RevalidationChannel::default();
        assert_eq!(channel.publish("/products"), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_published_paths() {
        let channel = RevalidationChannel::default();
        let mut rx = channel.subscribe();

        assert_eq!(channel.publish("/products/abc"), 1);

        let Ok(revalidation) = rx.recv().await else {
            panic!("expected a revalidation signal");
        };
        assert_eq!(revalidation.path, "/products/abc");
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_signal() {
        let channel = RevalidationChannel::default();
        let mut first = channel.subscribe();
        let mut second = channel.subscribe();

        assert_eq!(channel.publish("/products"), 2);

        let Ok(a) = first.recv().await else {
            panic!("expected a revalidation signal");
        };
        let Ok(b) = second.recv().await else {
            panic!("expected a revalidation signal");
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let channel = RevalidationChannel::default();
        let clone = channel.clone();
        let mut rx = channel.subscribe();

        clone.publish("/categories");

        let Ok(revalidation) = rx.recv().await else {
            panic!("expected a revalidation signal");
        };
        assert_eq!(revalidation.path, "/categories");
    }
}
