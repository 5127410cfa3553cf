//! Shared infrastructure for the Quayside JSON HTTP API.
//!
//! This crate provides the pieces every Quayside service binary is assembled
//! from:
//!
//! - [`AppContext`]: MongoDB client, selected database, and resolved settings
//! - [`Envelope`]: the uniform success-response wrapper (`msg` + optional `result`)
//! - [`ApiError`]: the single error-to-envelope translation point
//! - [`Validate`] / [`ValidatedJson`]: input validation producing structured issues
//! - [`middleware`]: trusted-host filtering and request correlation
//! - [`auth`]: bearer-token extraction and JWT claim decoding
//! - [`health_live`] / [`health_ready`]: liveness and readiness probes
//! - [`logging`]: structured JSON logging setup
//!
//! # Architecture
//!
//! Handlers are thin: they parse input, call collaborators through the
//! context, and return `Result<Envelope<T>, ApiError>`. Both arms serialize
//! to the fixed envelope contract, so no handler builds a response body by
//! hand:
//!
//! ```text
//! request → middleware chain → handler
//!             → Ok(Envelope<T>)   → {"msg": "ok"|"created", "result": ...}
//!             → Err(ApiError)     → {"msg": <kind>, "detail": ..., "errors": ...}
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a lazily-connected context that needs
//! no running database. Enable the `test-utils` feature to access it from
//! dependent crates.

pub mod auth;
mod envelope;
mod error;
mod health;
pub mod logging;
pub mod middleware;
mod settings;
mod state;
mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use envelope::{no_content, DocumentId, Envelope, Msg};
pub use error::{ApiError, ErrorEnvelope, ErrorKind, ValidationIssue};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat};
pub use settings::Settings;
pub use state::{ping_ok, AppContext, ContextError};
pub use validate::{Validate, ValidatedJson};
