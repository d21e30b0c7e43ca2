//! Redis cache backend for Ticketdesk.
//!
//! [`RedisEntityCache`] implements [`EntityCache`] with plain string keys:
//!
//! - `GET key` for reads
//! - `SET key value EX ttl` for writes (the TTL is reset on every write)
//! - `DEL key` for invalidation
//!
//! Keys and values are produced by
//! [`CacheAside`](ticketdesk_core::cache::CacheAside); this crate only moves
//! bytes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticketdesk_core::{CacheAside, CachePolicy};
//! use ticketdesk_redis::RedisEntityCache;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RedisEntityCache::new("redis://127.0.0.1:6379").await?;
//! let cache = CacheAside::new(Arc::new(backend), CachePolicy::default());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use ticketdesk_core::cache::{CacheError, CacheResult, EntityCache};

/// Redis-backed [`EntityCache`].
///
/// Cheap to clone: clones share one multiplexed connection through
/// `ConnectionManager`, which reconnects on failure.
#[derive(Clone)]
pub struct RedisEntityCache {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisEntityCache {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the connection fails.
    pub async fn new(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Backend(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::Backend(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("Connected to Redis cache");
        Ok(Self { conn_manager })
    }
}

/// `SET EX` rejects zero, so sub-second TTLs round up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl EntityCache for RedisEntityCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.conn_manager.clone();
        conn.get(key)
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to get `{key}` from Redis: {e}")))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn_manager.clone();
        let () = conn
            .set_ex(key, value, ttl_seconds(ttl))
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to set `{key}` in Redis: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn_manager.clone();
        let () = conn
            .del(key)
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to delete `{key}` from Redis: {e}")))?;
        Ok(())
    }
}
