//! Redis-backed aggregate cache.
//!
//! Aggregates are serialised as JSON and stored under generation-namespaced
//! keys (`freight:v1:g<generation>:<key>`) with `SET .. EX`. The generation
//! counter lives at `freight:v1:generation`. `clear(All)` increments the
//! counter, which makes every previously written key unreachable at once,
//! then sweeps superseded keys with `SCAN`/`DEL`. A `set` stamped with an old
//! generation writes under the old namespace and is never read.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::ports::{AggregateCache, AggregateCacheError, CacheGeneration, ClearTarget};
use crate::domain::{AggregateKey, CachedAggregate};

const NAMESPACE: &str = "freight:v1";
const GENERATION_KEY: &str = "freight:v1:generation";
const SWEEP_PATTERN: &str = "freight:v1:g[0-9]*:*";
const SWEEP_BATCH: usize = 500;

fn entry_key(generation: CacheGeneration, key: &AggregateKey) -> String {
    format!("{NAMESPACE}:g{generation}:{key}")
}

/// Generation held in the counter key; an absent counter is generation zero.
fn stored_generation(raw: Option<u64>) -> CacheGeneration {
    CacheGeneration::new(raw.unwrap_or(0))
}

/// Key a value computed under `observed` is written to, or `None` once a
/// clear has moved the counter to `current`.
fn write_key(
    key: &AggregateKey,
    observed: CacheGeneration,
    current: CacheGeneration,
) -> Option<String> {
    (observed == current).then(|| entry_key(observed, key))
}

fn generation_prefix(generation: CacheGeneration) -> String {
    format!("{NAMESPACE}:g{generation}:")
}

/// Keys from `batch` that belong to a generation other than `current`.
fn superseded(batch: Vec<String>, current: CacheGeneration) -> Vec<String> {
    let live = generation_prefix(current);
    batch
        .into_iter()
        .filter(|key| !key.starts_with(&live))
        .collect()
}

fn backend_error(error: RedisError) -> AggregateCacheError {
    AggregateCacheError::backend(error.to_string())
}

/// Aggregate cache using a pooled Redis connection.
#[derive(Clone)]
pub struct RedisAggregateCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisAggregateCache {
    /// Build a connection pool for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateCacheError::Backend`] when the URL is invalid or the
    /// pool cannot be created.
    pub async fn connect(url: &str) -> Result<Self, AggregateCacheError> {
        let manager = RedisConnectionManager::new(url).map_err(backend_error)?;
        let pool = Pool::builder()
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .await
            .map_err(backend_error)?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, AggregateCacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| AggregateCacheError::backend(err.to_string()))
    }

    async fn current_generation(
        conn: &mut PooledConnection<'_, RedisConnectionManager>,
    ) -> Result<CacheGeneration, AggregateCacheError> {
        let raw: Option<u64> = redis::cmd("GET")
            .arg(GENERATION_KEY)
            .query_async(&mut **conn)
            .await
            .map_err(backend_error)?;
        Ok(stored_generation(raw))
    }

    async fn sweep(
        conn: &mut PooledConnection<'_, RedisConnectionManager>,
        current: CacheGeneration,
    ) -> Result<usize, AggregateCacheError> {
        let mut cursor: u64 = 0;
        let mut removed = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(SWEEP_PATTERN)
                .arg("COUNT")
                .arg(SWEEP_BATCH)
                .query_async(&mut **conn)
                .await
                .map_err(backend_error)?;
            let stale = superseded(batch, current);
            if !stale.is_empty() {
                let deleted: usize = redis::cmd("DEL")
                    .arg(&stale)
                    .query_async(&mut **conn)
                    .await
                    .map_err(backend_error)?;
                removed += deleted;
            }
            if next == 0 {
                return Ok(removed);
            }
            cursor = next;
        }
    }
}

#[async_trait]
impl AggregateCache for RedisAggregateCache {
    async fn generation(&self) -> Result<CacheGeneration, AggregateCacheError> {
        let mut conn = self.connection().await?;
        Self::current_generation(&mut conn).await
    }

    async fn get(&self, key: &AggregateKey) -> Result<Option<CachedAggregate>, AggregateCacheError> {
        let mut conn = self.connection().await?;
        let generation = Self::current_generation(&mut conn).await?;
        let payload: Option<String> = redis::cmd("GET")
            .arg(entry_key(generation, key))
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        payload
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|err| AggregateCacheError::serialization(err.to_string()))
            })
            .transpose()
    }

    async fn set(
        &self,
        key: &AggregateKey,
        value: &CachedAggregate,
        ttl: Duration,
        observed: CacheGeneration,
    ) -> Result<(), AggregateCacheError> {
        let payload = serde_json::to_string(value)
            .map_err(|err| AggregateCacheError::serialization(err.to_string()))?;
        let mut conn = self.connection().await?;
        let current = Self::current_generation(&mut conn).await?;
        let Some(target) = write_key(key, observed, current) else {
            debug!(key = %key, observed = %observed, current = %current, "skipping superseded aggregate");
            return Ok(());
        };
        let seconds = ttl.as_secs().max(1);
        let () = redis::cmd("SET")
            .arg(target)
            .arg(payload)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn clear(&self, target: &ClearTarget) -> Result<(), AggregateCacheError> {
        let mut conn = self.connection().await?;
        match target {
            ClearTarget::All => {
                let next: u64 = redis::cmd("INCR")
                    .arg(GENERATION_KEY)
                    .query_async(&mut *conn)
                    .await
                    .map_err(backend_error)?;
                let removed = Self::sweep(&mut conn, CacheGeneration::new(next)).await?;
                debug!(generation = next, removed, "aggregate cache generation advanced");
            }
            ClearTarget::Key(key) => {
                let generation = Self::current_generation(&mut conn).await?;
                let _: usize = redis::cmd("DEL")
                    .arg(entry_key(generation, key))
                    .query_async(&mut *conn)
                    .await
                    .map_err(backend_error)?;
            }
        }
        Ok(())
    }
}
