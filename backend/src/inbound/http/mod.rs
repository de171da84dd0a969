//! HTTP inbound adapter exposing REST endpoints.

pub mod cargo;
pub mod cars;
pub mod error;
pub mod health;
pub mod state;
pub mod validation;

pub use error::ApiResult;
