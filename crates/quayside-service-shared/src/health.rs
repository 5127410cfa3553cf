//! Health check handlers.
//!
//! `/health/live` answers as long as the process runs; `/health/ready`
//! additionally pings the database, so orchestrators stop routing traffic
//! when the connection degrades after startup.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppContext;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// `"ok"` or `"not_ready: <reason>"`.
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Selected database name (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl HealthStatus {
    /// A healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            database: None,
        }
    }

    /// A ready status naming the live database.
    pub fn ready(service: &str, version: &str, database: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            database: Some(database.to_string()),
        }
    }

    /// A not-ready status with a reason.
    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            service: service.to_string(),
            version: version.to_string(),
            database: None,
        }
    }
}

/// Liveness probe handler. Depends on nothing external.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. Pings the database through the context.
pub async fn health_ready(State(context): State<AppContext>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match context.ping().await {
        Ok(()) => {
            let status = HealthStatus::ready(service, version, context.database().name());
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "readiness probe failed");
            let status = HealthStatus::not_ready(service, version, "database unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
