//! Aggregate cache adapters.
//!
//! - [`InMemoryAggregateCache`]: process-local map for tests and single-node runs.
//! - [`RedisAggregateCache`]: `bb8-redis` pool for shared deployments.
//!
//! Both honour the generation contract of the `AggregateCache` port.

mod in_memory;
mod redis;

pub use in_memory::InMemoryAggregateCache;
pub use redis::RedisAggregateCache;
