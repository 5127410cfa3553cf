//! Quayside JSON HTTP API: application factory and documentation routes.
//!
//! The library half of this crate exists so integration tests can assemble
//! the exact router the binary serves. Business routers are registered
//! through [`app::create_app_with`]; the skeleton itself only wires
//! middleware, health probes, and API documentation.

pub mod app;
pub mod docs;
