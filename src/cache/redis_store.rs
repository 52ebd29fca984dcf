//! Redis-backed cache store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::debug;

use super::{CacheEntry, CacheError, CacheKey, CacheStore};

/// Stores entries as JSON strings with a Redis expiry.
pub struct RedisCacheStore {
    connection_manager: ConnectionManager,
}

impl RedisCacheStore {
    /// Connect to the Redis server at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let connection_manager = ConnectionManager::new(client).await?;
        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.connection_manager.clone();
        let raw: Option<String> = conn.get(key.as_str()).await?;

        match raw {
            Some(data) => {
                debug!("Cache hit for key: {}", key);
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => {
                debug!("Cache miss for key: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        key: &CacheKey,
        entry: &CacheEntry,
        retention: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection_manager.clone();
        let serialized = serde_json::to_string(entry)?;
        // Redis rejects a zero expiry
        let seconds = retention.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key.as_str(), serialized, seconds)
            .await?;
        debug!("Cached {} with retention {}s", key, seconds);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
