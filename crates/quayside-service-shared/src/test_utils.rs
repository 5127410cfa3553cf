//! Test utilities for handler and service testing.
//!
//! The MongoDB driver connects lazily, so a context assembled here works
//! for any test that never actually issues a database operation — no
//! running server required. The test URI points at a closed port with
//! aggressive timeouts so probe-path tests fail fast instead of hanging.

use crate::settings::Settings;
use crate::state::AppContext;

/// Settings for tests: unreachable database, short timeouts, fixed secret.
pub fn test_settings() -> Settings {
    Settings {
        app_name: "Quayside Test".to_string(),
        mongodb_uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200\
                      &connectTimeoutMS=200&directConnection=true"
            .to_string(),
        mongodb_db_name: "quayside_test".to_string(),
        jwt_secret: "test-secret".to_string(),
        ..Settings::default()
    }
}

/// A context assembled without the liveness probe.
///
/// # Panics
///
/// Panics if the test connection string is rejected, which indicates a test
/// configuration issue.
pub async fn test_context() -> AppContext {
    AppContext::assemble(test_settings())
        .await
        .expect("failed to assemble test context")
}

/// A context with custom settings, still without the probe.
///
/// # Panics
///
/// Panics if the connection string is rejected.
pub async fn test_context_with(settings: Settings) -> AppContext {
    AppContext::assemble(settings)
        .await
        .expect("failed to assemble test context")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_carries_test_settings() {
        let context = test_context().await;
        assert_eq!(context.settings().jwt_secret, "test-secret");
        assert_eq!(context.database().name(), "quayside_test");
    }
}
