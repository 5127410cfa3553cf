//! Application factory.
//!
//! Assembles the axum router: built-in middleware in registration order
//! (trusted-host filter, CORS, gzip compression, request correlation),
//! health probes, documentation routes, and whatever business routers the
//! caller merges in.

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::compression::predicate::SizeAbove;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use quayside_service_shared::middleware::{correlate_request, trusted_host, AllowedHosts};
use quayside_service_shared::{health_live, health_ready, AppContext};

/// Response bodies below this size are not worth compressing.
const GZIP_MIN_BYTES: u16 = 1024;

/// Build the application with no business routers (health + docs only).
pub fn create_app(context: AppContext) -> Router {
    create_app_with(context, Router::new())
}

/// Build the application and merge in business routers.
///
/// Middleware executes in registration order on the way in and reverse
/// order on the way out: the trusted-host filter sees the request first and
/// may short-circuit before CORS or compression run.
pub fn create_app_with(context: AppContext, routers: Router<AppContext>) -> Router {
    let settings = context.settings();
    let allowed_hosts = AllowedHosts::new(settings.allowed_hosts.clone());
    let cors = cors_layer(&settings.cors_allow_origins);
    let docs = crate::docs::router(settings);

    Router::new()
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .merge(docs)
        .merge(routers)
        // Layers wrap bottom-up: the last one added runs first.
        .layer(axum::middleware::from_fn(correlate_request))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new().compress_when(SizeAbove::new(GZIP_MIN_BYTES)))
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            allowed_hosts,
            trusted_host,
        ))
        .with_state(context)
}

/// Permissive CORS with credentials.
///
/// The CORS spec forbids `Access-Control-Allow-Origin: *` together with
/// credentials, so a `*` allow-list mirrors the request origin instead;
/// methods and headers always mirror for the same reason.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
