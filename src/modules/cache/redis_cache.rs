use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use super::backend::{CacheBackend, CacheError};
use crate::core::config::CacheConfig;

/// Redis-backed cache over a deadpool connection pool
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    /// Build the pool. Connections are opened lazily, so an unreachable Redis does not stop
    /// startup; calls fail with [`CacheError::Connection`] until it comes back.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let mut redis_config = deadpool_redis::Config::from_url(&config.redis_url);
        let mut pool_config = PoolConfig::new(config.redis_pool_size);
        pool_config.timeouts.wait = Some(config.redis_timeout);
        pool_config.timeouts.create = Some(config.redis_timeout);
        pool_config.timeouts.recycle = Some(config.redis_timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        match pool.get().await {
            Ok(_) => info!(url = %redact(&config.redis_url), "Connected to Redis"),
            Err(e) => warn!(
                url = %redact(&config.redis_url),
                error = %e,
                "Redis not reachable at startup, cache reads will fall back until it is"
            ),
        }

        Ok(Self { pool })
    }
}

/// Strip credentials from a connection URL before logging it
fn redact(url: &str) -> &str {
    url.split('@').next_back().unwrap_or("***")
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))?;

        debug!(key = %key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))?;

        debug!(key = %key, ttl_secs = ttl_secs, "Redis SET");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "redis"
    }
}
