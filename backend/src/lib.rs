//! Freight matching backend.
//!
//! - [`domain`]: value types, the distance engine, matching, mutation,
//!   relocation and seeding services, and the ports they depend on.
//! - [`inbound`]: actix-web handlers translating HTTP into port calls.
//! - [`outbound`]: store, cache and dataset adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
