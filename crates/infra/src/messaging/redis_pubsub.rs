//! Redis pub/sub-backed messaging client (optional).
//!
//! Note: Redis pub/sub is not durable (messages are dropped if no subscriber
//! is connected at publish time). A successful publish only means Redis
//! accepted the message.

use redis::Commands;
use thiserror::Error;
use tracing::debug;

use tradefeed_events::MessagingClient;

#[derive(Debug, Error)]
pub enum RedisClientError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
}

/// `PUBLISH topic payload` over a fresh connection per call.
#[derive(Debug, Clone)]
pub struct RedisPubSubClient {
    client: redis::Client,
}

impl RedisPubSubClient {
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, RedisClientError> {
        let client = redis::Client::open(redis_url.as_ref())?;
        Ok(Self { client })
    }
}

impl MessagingClient for RedisPubSubClient {
    type Error = RedisClientError;

    fn publish(&self, topic: &str, payload: &str) -> Result<(), Self::Error> {
        let mut conn = self.client.get_connection()?;
        let receivers: i64 = conn.publish(topic, payload)?;

        debug!(%topic, receivers, "redis publish accepted");
        Ok(())
    }
}
