//! Resolved application settings.
//!
//! A read-only snapshot of configuration, loaded once at startup from the
//! environment and carried inside the application context. These are the
//! recognized options; unknown environment variables do not affect behavior.
//!
//! # Environment Variables
//!
//! - `APP_NAME`, `APP_DESCRIPTION`, `TERM_OF_SERVICE`
//! - `CONTACT_NAME`, `CONTACT_URL`, `CONTACT_EMAIL`
//! - `DOCS_URL` (OpenAPI document path, empty to disable)
//! - `REDOC_URL` (Redoc page path, empty to disable)
//! - `MONGODB_URI`, `MONGODB_DB_NAME`
//! - `ALLOWED_HOSTS` (comma-separated, default `*`)
//! - `CORS_ALLOW_ORIGINS` (comma-separated, default `*`)
//! - `JWT_SECRET`
//! - `SERVICE_PORT` (default 8080)

use serde::{Deserialize, Serialize};

/// Read-only configuration shared by every request handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Display name, used in the OpenAPI document.
    pub app_name: String,
    /// Short description for the OpenAPI document.
    pub description: String,
    /// Service version, baked in at build time.
    pub version: String,
    /// Terms-of-service URL for the OpenAPI document.
    pub term_of_service: String,
    pub contact_name: String,
    pub contact_url: String,
    pub contact_email: String,
    /// Path serving the OpenAPI document; `None` disables it.
    pub docs_url: Option<String>,
    /// Path serving the Redoc page; `None` disables it.
    pub redoc_url: Option<String>,
    /// MongoDB connection string.
    pub mongodb_uri: String,
    /// Database selected from the client at startup.
    pub mongodb_db_name: String,
    /// Host header allow-list for the trusted-host filter.
    pub allowed_hosts: Vec<String>,
    /// Origin allow-list for CORS; `*` mirrors the request origin.
    pub cors_allow_origins: Vec<String>,
    /// HS256 secret for bearer-token decoding.
    pub jwt_secret: String,
    /// HTTP listen port.
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Quayside".to_string(),
            description: "Quayside JSON HTTP API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            term_of_service: String::new(),
            contact_name: String::new(),
            contact_url: String::new(),
            contact_email: String::new(),
            docs_url: Some("/openapi.json".to_string()),
            redoc_url: Some("/redoc".to_string()),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db_name: "quayside".to_string(),
            allowed_hosts: vec!["*".to_string()],
            cors_allow_origins: vec!["*".to_string()],
            jwt_secret: "dev-secret".to_string(),
            port: 8080,
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        if std::env::var("JWT_SECRET").is_err() {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
        }

        Self {
            app_name: env_or("APP_NAME", defaults.app_name),
            description: env_or("APP_DESCRIPTION", defaults.description),
            version: defaults.version,
            term_of_service: env_or("TERM_OF_SERVICE", defaults.term_of_service),
            contact_name: env_or("CONTACT_NAME", defaults.contact_name),
            contact_url: env_or("CONTACT_URL", defaults.contact_url),
            contact_email: env_or("CONTACT_EMAIL", defaults.contact_email),
            docs_url: env_path("DOCS_URL", defaults.docs_url),
            redoc_url: env_path("REDOC_URL", defaults.redoc_url),
            mongodb_uri: env_or("MONGODB_URI", defaults.mongodb_uri),
            mongodb_db_name: env_or("MONGODB_DB_NAME", defaults.mongodb_db_name),
            allowed_hosts: env_list("ALLOWED_HOSTS", defaults.allowed_hosts),
            cors_allow_origins: env_list("CORS_ALLOW_ORIGINS", defaults.cors_allow_origins),
            jwt_secret: env_or("JWT_SECRET", defaults.jwt_secret),
            port: std::env::var("SERVICE_PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// An explicitly empty value disables the route.
fn env_path(key: &str, default: Option<String>) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value),
        Err(_) => default,
    }
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(key) {
        Ok(value) => value
            .split(',')
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect(),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_everything() {
        let settings = Settings::default();
        assert_eq!(settings.allowed_hosts, vec!["*"]);
        assert_eq!(settings.cors_allow_origins, vec!["*"]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.docs_url.as_deref(), Some("/openapi.json"));
        assert_eq!(settings.redoc_url.as_deref(), Some("/redoc"));
    }

    #[test]
    fn version_tracks_the_crate() {
        assert_eq!(Settings::default().version, env!("CARGO_PKG_VERSION"));
    }
}
