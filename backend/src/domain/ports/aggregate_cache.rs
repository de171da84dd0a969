//! Port interface for caching computed match aggregates.
//!
//! Adapters keep a monotonically increasing generation. `clear(All)` advances
//! it, and `set` is only honoured while the generation observed before the
//! value was computed is still current. A value computed before a committed
//! write therefore can never be served after that write's `clear(All)` has
//! returned, even if the computing reader populates the cache afterwards.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{AggregateKey, CachedAggregate};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by aggregate cache adapters.
    pub enum AggregateCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "aggregate cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "aggregate cache serialisation failed: {message}",
    }
}

/// Cache generation observed before computing an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CacheGeneration(u64);

impl CacheGeneration {
    /// Wrap a raw generation number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw generation number.
    pub fn get(self) -> u64 {
        self.0
    }

    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scope of an invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearTarget {
    /// Every aggregate, regardless of key shape.
    All,
    /// A single aggregate.
    Key(AggregateKey),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregateCache: Send + Sync {
    /// Current generation. Read this before computing a value to `set`.
    async fn generation(&self) -> Result<CacheGeneration, AggregateCacheError>;

    /// Read a cached aggregate.
    async fn get(&self, key: &AggregateKey) -> Result<Option<CachedAggregate>, AggregateCacheError>;

    /// Store an aggregate for `ttl` unless the generation has moved past
    /// `observed`.
    async fn set(
        &self,
        key: &AggregateKey,
        value: &CachedAggregate,
        ttl: Duration,
        observed: CacheGeneration,
    ) -> Result<(), AggregateCacheError>;

    /// Remove one aggregate or all of them.
    async fn clear(&self, target: &ClearTarget) -> Result<(), AggregateCacheError>;
}
