//! Structured logging setup.
//!
//! Call [`init_logging`] once at startup. The filter comes from `RUST_LOG`
//! (default `info`); the output format from `LOG_FORMAT`, either `json`
//! (default, production) or `text` (development).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging.
    #[default]
    Json,
    /// Human-readable text logging.
    Text,
}

impl LogFormat {
    /// Read `LOG_FORMAT` from the environment.
    ///
    /// Accepts `text` or `pretty` for the text format; anything else is
    /// JSON.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::Json,
        }
    }

    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Initialize the tracing subscriber. Call once, before anything logs.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => {
            registry.with(fmt::layer().pretty()).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false);
            registry.with(json_layer).init();
        }
    }
}
