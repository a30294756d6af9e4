use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Counts invalidations so a read-through fill can tell whether a write
/// landed between its store read and its cache insert
#[derive(Debug, Default)]
pub struct InvalidationClock(AtomicU64);

impl InvalidationClock {
    pub fn now(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn tick(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    /// No invalidation happened since `seen` was read
    pub fn unchanged_since(&self, seen: u64) -> bool {
        self.now() == seen
    }
}

/// Multi-tier cache manager
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Only profile snapshots are cached; ranked results are always computed
/// from fresh candidate reads.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
    clock: InvalidationClock,
}

impl CacheManager {
    /// Connect to Redis and build the L1 tier
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
            clock: InvalidationClock::default(),
        })
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);
            self.l1_cache
                .insert(key.to_string(), json.as_bytes().to_vec())
                .await;
            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Clock reading to take before reading the value a fill will cache
    pub fn fill_token(&self) -> u64 {
        self.clock.now()
    }

    /// Cache a value read after `token` was taken, unless an invalidation
    /// raced with the read. The entry is re-checked after insertion and
    /// dropped if an invalidation slipped in between.
    pub async fn fill<T>(&self, key: &str, value: &T, token: u64) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        if !self.clock.unchanged_since(token) {
            tracing::trace!("Skipping stale fill: {}", key);
            return Ok(());
        }
        self.set(key, value).await?;
        if !self.clock.unchanged_since(token) {
            self.delete(key).await?;
        }
        Ok(())
    }

    /// Drop a value after its source changed
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.clock.tick();
        self.delete(key).await
    }

    /// Delete a value from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a profile snapshot
    pub fn profile(user_id: &str) -> String {
        format!("profile:{}", user_id)
    }
}
