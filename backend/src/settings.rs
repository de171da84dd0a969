//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `FREIGHT_*` environment variables (or the matching CLI
//! flags and config file keys) once at startup. [`AppSettings::validate`]
//! turns the raw values into typed [`Settings`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Raw configuration values.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FREIGHT")]
pub struct AppSettings {
    /// Seconds between relocation cycles.
    #[ortho_config(default = 180)]
    pub relocation_interval_secs: u64,
    /// Lifetime of cached aggregates in seconds.
    #[ortho_config(default = 300)]
    pub cache_ttl_secs: u64,
    /// PostgreSQL URL; the in-process store is used when absent.
    pub database_url: Option<String>,
    /// Redis URL; the in-process cache is used when absent.
    pub redis_url: Option<String>,
    /// Listen address, `0.0.0.0:8080` when absent.
    pub bind_addr: Option<String>,
    /// `uszips.csv`-style dataset loaded into an empty location table.
    pub locations_csv: Option<PathBuf>,
    /// Cars created when the fleet is empty.
    #[ortho_config(default = 20)]
    pub seed_car_count: usize,
}

/// Rejected configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("bind address {value:?} is not a socket address")]
    BindAddr { value: String },
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub relocation_interval: Duration,
    pub cache_ttl: Duration,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub locations_csv: Option<PathBuf>,
    pub seed_car_count: usize,
}

fn positive_secs(value: u64, field: &'static str) -> Result<Duration, SettingsError> {
    if value == 0 {
        return Err(SettingsError::ZeroDuration { field });
    }
    Ok(Duration::from_secs(value))
}

impl AppSettings {
    /// Check ranges and parse the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for a zero interval or TTL, or an
    /// unparsable bind address.
    pub fn validate(self) -> Result<Settings, SettingsError> {
        let bind = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind
            .parse()
            .map_err(|_| SettingsError::BindAddr { value: bind.clone() })?;
        Ok(Settings {
            relocation_interval: positive_secs(
                self.relocation_interval_secs,
                "relocation_interval_secs",
            )?,
            cache_ttl: positive_secs(self.cache_ttl_secs, "cache_ttl_secs")?,
            database_url: self.database_url,
            redis_url: self.redis_url,
            bind_addr,
            locations_csv: self.locations_csv,
            seed_car_count: self.seed_car_count,
        })
    }
}
