//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CarCommand, CargoCommand, CargoMatchQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub matches: Arc<dyn CargoMatchQuery>,
    pub cargo: Arc<dyn CargoCommand>,
    pub cars: Arc<dyn CarCommand>,
}

impl HttpState {
    /// Construct state from the match query and mutation ports.
    pub fn new(
        matches: Arc<dyn CargoMatchQuery>,
        cargo: Arc<dyn CargoCommand>,
        cars: Arc<dyn CarCommand>,
    ) -> Self {
        Self {
            matches,
            cargo,
            cars,
        }
    }
}
