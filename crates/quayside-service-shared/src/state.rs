//! Application context and lifecycle.
//!
//! [`AppContext`] owns the MongoDB client, the selected database, and the
//! resolved settings for the lifetime of the process. It is created once at
//! startup, cloned cheaply into axum's `State`, and released exactly once at
//! shutdown: [`AppContext::shutdown`] consumes the value, so a double
//! release does not compile.

use std::sync::Arc;

use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Database};
use thiserror::Error;

use crate::settings::Settings;

/// Error during context construction or the liveness probe.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The connection string was rejected or the client could not be built.
    #[error("failed to create MongoDB client: {0}")]
    Connect(#[source] mongodb::error::Error),

    /// The liveness probe did not complete.
    #[error("liveness probe failed: {0}")]
    Probe(#[source] mongodb::error::Error),

    /// The liveness probe completed but did not answer `ok: 1`.
    #[error("database '{0}' answered the liveness probe with a non-success status")]
    ProbeRejected(String),
}

/// Process-wide application context.
///
/// Cheaply cloneable (`Arc` inner); handlers borrow it through axum's
/// `State` extractor and never own it.
///
/// # Example
///
/// ```ignore
/// use axum::{extract::State, Router, routing::get};
/// use quayside_service_shared::AppContext;
///
/// async fn handler(State(context): State<AppContext>) {
///     let db = context.database();
///     // ... issue operations against it
/// }
///
/// let context = AppContext::connect(settings).await?;
/// let app = Router::new().route("/", get(handler)).with_state(context);
/// ```
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    client: Client,
    db: Database,
    settings: Settings,
}

impl AppContext {
    /// Connect and verify the database answers the liveness probe.
    ///
    /// This is the startup path: if the probe fails or answers anything but
    /// `ok: 1`, the error propagates and the server must not start serving.
    pub async fn connect(settings: Settings) -> Result<Self, ContextError> {
        let context = Self::assemble(settings).await?;

        tracing::info!(db = context.inner.db.name(), "probing database liveness");
        context.ping().await?;
        tracing::info!(db = context.inner.db.name(), "database connection is live");

        Ok(context)
    }

    /// Build the context without probing.
    ///
    /// The driver connects lazily, so this never touches the network. Used
    /// by tests; production startup goes through [`AppContext::connect`].
    pub async fn assemble(settings: Settings) -> Result<Self, ContextError> {
        let client = Client::with_uri_str(&settings.mongodb_uri)
            .await
            .map_err(ContextError::Connect)?;
        let db = client.database(&settings.mongodb_db_name);

        Ok(Self {
            inner: Arc::new(AppContextInner {
                client,
                db,
                settings,
            }),
        })
    }

    /// Run the `ping` command against the selected database.
    pub async fn ping(&self) -> Result<(), ContextError> {
        let pong = self
            .inner
            .db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(ContextError::Probe)?;

        if !ping_ok(&pong) {
            return Err(ContextError::ProbeRejected(
                self.inner.db.name().to_string(),
            ));
        }
        Ok(())
    }

    /// The database selected at startup, shared read-only by all handlers.
    pub fn database(&self) -> &Database {
        &self.inner.db
    }

    /// The resolved settings.
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Release the underlying client.
    ///
    /// Consumes the context; call it once from the owning task after the
    /// server has stopped, on every exit path.
    pub async fn shutdown(self) {
        tracing::info!("closing MongoDB client");
        self.inner.client.clone().shutdown().await;
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.inner.db.name())
            .field("app_name", &self.inner.settings.app_name)
            .finish()
    }
}

/// Whether a `ping` reply indicates a usable connection.
///
/// The server reports `ok` as a numeric value; anything but 1 (or a missing
/// field) means the connection must not be trusted.
pub fn ping_ok(pong: &Document) -> bool {
    match pong.get("ok") {
        Some(Bson::Double(value)) => *value == 1.0,
        Some(Bson::Int32(value)) => *value == 1,
        Some(Bson::Int64(value)) => *value == 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn ping_ok_accepts_numeric_one() {
        assert!(ping_ok(&doc! { "ok": 1.0 }));
        assert!(ping_ok(&doc! { "ok": 1_i32 }));
        assert!(ping_ok(&doc! { "ok": 1_i64 }));
    }

    #[test]
    fn ping_ok_rejects_everything_else() {
        assert!(!ping_ok(&doc! { "ok": 0.0 }));
        assert!(!ping_ok(&doc! { "ok": 0_i32 }));
        assert!(!ping_ok(&doc! { "ok": "1" }));
        assert!(!ping_ok(&doc! {}));
    }

    #[tokio::test]
    async fn assemble_never_touches_the_network() {
        let context = test_utils::test_context().await;
        assert_eq!(context.database().name(), "quayside_test");
    }

    #[tokio::test]
    async fn context_clones_share_the_same_database() {
        let context = test_utils::test_context().await;
        let clone = context.clone();
        assert_eq!(context.database().name(), clone.database().name());
    }

    #[tokio::test]
    async fn connect_fails_fast_when_the_probe_cannot_answer() {
        // Nothing listens on the test URI; the short server-selection
        // timeout keeps this quick.
        let result = AppContext::connect(test_utils::test_settings()).await;
        assert!(matches!(result, Err(ContextError::Probe(_))));
    }

    #[tokio::test]
    async fn debug_omits_credentials() {
        let context = test_utils::test_context().await;
        let debug = format!("{context:?}");
        assert!(debug.contains("quayside_test"));
        assert!(!debug.contains("mongodb://"));
    }
}
