//! Process-local aggregate cache.
//!
//! Entries live in a mutex-guarded map together with the generation they
//! were computed under. `set` compares the caller's observed generation with
//! the current one while holding the lock, so a value computed before a
//! `clear(All)` is dropped instead of stored.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::ports::{AggregateCache, AggregateCacheError, CacheGeneration, ClearTarget};
use crate::domain::{AggregateKey, CachedAggregate};

#[derive(Debug)]
struct Entry {
    value: CachedAggregate,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    generation: CacheGeneration,
    entries: HashMap<AggregateKey, Entry>,
}

/// Aggregate cache backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryAggregateCache {
    state: Mutex<State>,
}

impl InMemoryAggregateCache {
    /// Empty cache at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AggregateCacheError> {
        self.state
            .lock()
            .map_err(|_| AggregateCacheError::backend("in-memory cache lock poisoned"))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock()
            .map(|state| {
                let now = Instant::now();
                state
                    .entries
                    .values()
                    .filter(|entry| entry.expires_at > now)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AggregateCache for InMemoryAggregateCache {
    async fn generation(&self) -> Result<CacheGeneration, AggregateCacheError> {
        Ok(self.lock()?.generation)
    }

    async fn get(&self, key: &AggregateKey) -> Result<Option<CachedAggregate>, AggregateCacheError> {
        let mut state = self.lock()?;
        let now = Instant::now();
        match state.entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                state.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &AggregateKey,
        value: &CachedAggregate,
        ttl: Duration,
        observed: CacheGeneration,
    ) -> Result<(), AggregateCacheError> {
        let mut state = self.lock()?;
        if state.generation != observed {
            debug!(
                key = %key,
                observed = %observed,
                current = %state.generation,
                "dropping aggregate computed under a superseded generation"
            );
            return Ok(());
        }
        state.entries.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn clear(&self, target: &ClearTarget) -> Result<(), AggregateCacheError> {
        let mut state = self.lock()?;
        match target {
            ClearTarget::All => {
                state.generation = state.generation.next();
                state.entries.clear();
            }
            ClearTarget::Key(key) => {
                state.entries.remove(key);
            }
        }
        Ok(())
    }
}
