//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory_store**: in-process fleet store implementing the same ports
//! - **cache**: aggregate caches (in-process and Redis)
//! - **csv_locations**: location dataset reader
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod cache;
pub mod csv_locations;
pub mod memory_store;
pub mod persistence;
