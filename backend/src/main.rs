//! Backend entry-point: loads settings, prepares adapters and runs the server.

mod server;

use std::ffi::OsString;
use std::io;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use freight::inbound::http::health::HealthState;
use freight::outbound::cache::RedisAggregateCache;
use freight::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use freight::settings::{AppSettings, Settings};
use server::{ServerConfig, create_server};

fn load_settings() -> io::Result<Settings> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let raw = AppSettings::load_from_iter(args)
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    raw.validate()
        .map_err(|err| io::Error::other(format!("invalid settings: {err}")))
}

async fn server_config(settings: &Settings) -> io::Result<ServerConfig> {
    let mut config = ServerConfig::new(settings);

    match &settings.database_url {
        Some(url) => {
            run_migrations(url).await.map_err(io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; using the in-process fleet store"),
    }

    match &settings.redis_url {
        Some(url) => {
            let cache = RedisAggregateCache::connect(url)
                .await
                .map_err(io::Error::other)?;
            config = config.with_redis_cache(cache);
        }
        None => info!("no redis configured; using the in-process aggregate cache"),
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings()?;
    let config = server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let (server, scheduler) = create_server(health_state.clone(), config).await?;
    info!(bind_addr = %settings.bind_addr, "server listening");

    let outcome = server.await;
    health_state.mark_draining();
    scheduler.shutdown().await;
    outcome
}
