//! Redis pub/sub bridge for revalidation signals (optional).
//!
//! Redis pub/sub drops messages whenever no subscriber is connected. That
//! matches the delivery contract of revalidation signals (best-effort), so no
//! stream or broker sits in between.

use redis::Commands;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{Revalidation, RevalidationChannel};

#[derive(Debug)]
pub enum RedisRevalidationError {
    Redis(String),
    Serialize(String),
}

/// Redis pub/sub publisher for JSON revalidation signals.
#[derive(Debug, Clone)]
pub struct RedisRevalidationBus {
    client: redis::Client,
    channel: String,
}

impl RedisRevalidationBus {
    pub fn new(
        redis_url: impl AsRef<str>,
        channel: impl Into<String>,
    ) -> Result<Self, RedisRevalidationError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisRevalidationError::Redis(e.to_string()))?;
        Ok(Self {
            client,
            channel: channel.into(),
        })
    }

    pub fn publish(&self, revalidation: &Revalidation) -> Result<(), RedisRevalidationError> {
        let payload = serde_json::to_string(revalidation)
            .map_err(|e| RedisRevalidationError::Serialize(e.to_string()))?;

        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| RedisRevalidationError::Redis(e.to_string()))?;

        let _: i64 = conn
            .publish(&self.channel, payload)
            .map_err(|e| RedisRevalidationError::Redis(e.to_string()))?;

        Ok(())
    }

    /// Forward every signal from the in-process channel to Redis.
    ///
    /// Runs until the channel closes. Redis publish failures are logged and
    /// skipped so a flaky Redis never blocks in-process subscribers.
    pub fn forward_from(self, channel: &RevalidationChannel) -> JoinHandle<()> {
        let mut rx = channel.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(revalidation) => {
                        let bus = self.clone();
                        // redis::Commands is blocking; keep it off the async workers.
                        let outcome =
                            tokio::task::spawn_blocking(move || bus.publish(&revalidation)).await;
                        match outcome {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => {
                                warn!(error = ?e, "failed to forward revalidation to redis");
                            }
                            Err(e) => {
                                warn!(error = %e, "revalidation forwarding task panicked");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "revalidation forwarder lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
