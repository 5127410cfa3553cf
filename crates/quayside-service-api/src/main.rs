//! Quayside JSON HTTP API service entry point.
//!
//! # Endpoints
//!
//! - `GET /health/live` - liveness probe
//! - `GET /health/ready` - readiness probe (pings the database)
//! - `GET /openapi.json` - OpenAPI document (path configurable, `DOCS_URL`)
//! - `GET /redoc` - Redoc page (path configurable, `REDOC_URL`)
//!
//! # Configuration
//!
//! - `MONGODB_URI`, `MONGODB_DB_NAME` - database connection
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - log level (default: info)
//! - `LOG_FORMAT` - log format: json (default) or text
//!
//! Startup fails fast: if the database does not answer the liveness probe,
//! the process exits non-zero without ever binding the listener.

use std::net::SocketAddr;

use tracing::{error, info};

use quayside_service_api::app::create_app;
use quayside_service_shared::{init_logging, AppContext, LogFormat, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::from_env());

    let settings = Settings::from_env();
    info!(
        app = %settings.app_name,
        db = %settings.mongodb_db_name,
        port = settings.port,
        "starting service"
    );

    // Connect and probe before accepting any traffic.
    let context = AppContext::connect(settings).await.map_err(|err| {
        error!(error = %err, "startup liveness probe failed");
        err
    })?;

    let result = serve(context.clone()).await;

    // Release the client exactly once, on every exit path past a
    // successful connect.
    context.shutdown().await;
    result
}

async fn serve(context: AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let port = context.settings().port;
    let app = create_app(context);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown signal handler");
        return;
    }
    info!("shutdown signal received");
}
