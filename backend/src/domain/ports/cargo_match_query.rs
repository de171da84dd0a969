//! Driving port for cargo match aggregations.
//!
//! Inbound adapters call this port for list and detail reads. Implementations
//! may answer from a cache but must never return a value computed before a
//! committed write whose invalidation has already completed.

use async_trait::async_trait;

use crate::domain::{CargoDetail, CargoId, CargoMatchSummary, Error, MatchQuery};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CargoMatchQuery: Send + Sync {
    /// Nearby-car counts for every cargo in the query's weight band.
    async fn list_matches(&self, query: MatchQuery) -> Result<Vec<CargoMatchSummary>, Error>;

    /// One cargo with every car's distance to its pickup location.
    async fn cargo_detail(&self, id: CargoId) -> Result<CargoDetail, Error>;
}
