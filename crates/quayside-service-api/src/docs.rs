//! OpenAPI documentation routes.
//!
//! The OpenAPI document is served at `docs_url` and a Redoc page at
//! `redoc_url`; either is disabled by configuring the path empty. Envelope
//! and error schemas are registered so generated clients see the exact
//! response contract; per-endpoint typed envelopes come for free from the
//! generic `Envelope<T>` schema names.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::ContactBuilder;
use utoipa::OpenApi;

use quayside_service_shared::{
    AppContext, Envelope, ErrorEnvelope, ErrorKind, HealthStatus, Msg, Settings, ValidationIssue,
};

#[derive(OpenApi)]
#[openapi(components(schemas(
    Msg,
    ErrorKind,
    ErrorEnvelope,
    ValidationIssue,
    HealthStatus,
    Envelope<HealthStatus>,
)))]
struct ApiDoc;

/// Routes for the OpenAPI document and the Redoc page, per settings.
pub fn router(settings: &Settings) -> Router<AppContext> {
    let mut router = Router::new();

    if let Some(path) = &settings.docs_url {
        let doc = openapi(settings);
        router = router.route(
            path,
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        );
    }

    if let Some(path) = &settings.redoc_url {
        let spec_path = settings
            .docs_url
            .clone()
            .unwrap_or_else(|| "/openapi.json".to_string());
        let page = redoc_page(&settings.app_name, &spec_path);
        router = router.route(
            path,
            get(move || {
                let page = page.clone();
                async move { Html(page) }
            }),
        );
    }

    router
}

/// The assembled document with runtime metadata from settings.
fn openapi(settings: &Settings) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = settings.app_name.clone();
    doc.info.description = Some(settings.description.clone());
    doc.info.version = settings.version.clone();
    if !settings.term_of_service.is_empty() {
        doc.info.terms_of_service = Some(settings.term_of_service.clone());
    }
    doc.info.contact = Some(
        ContactBuilder::new()
            .name(Some(settings.contact_name.clone()))
            .url(Some(settings.contact_url.clone()))
            .email(Some(settings.contact_email.clone()))
            .build(),
    );
    doc
}

fn redoc_page(title: &str, spec_path: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
  </head>
  <body>
    <redoc spec-url="{spec_path}"></redoc>
    <script src="https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js"></script>
  </body>
</html>
"#
    )
}
