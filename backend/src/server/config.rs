//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use freight::outbound::cache::RedisAggregateCache;
use freight::outbound::persistence::DbPool;
use freight::settings::Settings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) redis_cache: Option<RedisAggregateCache>,
    pub(crate) cache_ttl: Duration,
    pub(crate) relocation_interval: Duration,
    pub(crate) locations_csv: Option<PathBuf>,
    pub(crate) seed_car_count: usize,
}

impl ServerConfig {
    /// Take timings, seeding and the listen address from validated settings.
    ///
    /// Without a pool or cache attached the server runs on in-process
    /// adapters.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            bind_addr: settings.bind_addr,
            db_pool: None,
            redis_cache: None,
            cache_ttl: settings.cache_ttl,
            relocation_interval: settings.relocation_interval,
            locations_csv: settings.locations_csv.clone(),
            seed_car_count: settings.seed_car_count,
        }
    }

    /// Use the PostgreSQL repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Use the shared Redis aggregate cache.
    #[must_use]
    pub fn with_redis_cache(mut self, cache: RedisAggregateCache) -> Self {
        self.redis_cache = Some(cache);
        self
    }
}
