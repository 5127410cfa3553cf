//! Black-box tests for the envelope and middleware contract.
//!
//! These register representative business routes through the factory's
//! extension seam and verify the wire contract end to end: exact status
//! codes and `msg` values, validation issue lists, the 401 challenge
//! header, and that internal errors reveal nothing.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use quayside_service_api::app::create_app_with;
use quayside_service_shared::test_utils::{test_context, test_context_with, test_settings};
use quayside_service_shared::{
    auth, ApiError, AppContext, DocumentId, Envelope, Validate, ValidatedJson, ValidationIssue,
};

#[derive(Debug, Serialize)]
struct Widget {
    id: DocumentId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreateWidget {
    name: String,
    quantity: i64,
}

impl Validate for CreateWidget {
    fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::new("body.name", "must not be empty"));
        }
        if self.quantity < 0 {
            issues.push(
                ValidationIssue::new("body.quantity", "must be non-negative")
                    .with_context(self.quantity),
            );
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

async fn create_widget(
    ValidatedJson(body): ValidatedJson<CreateWidget>,
) -> Result<Envelope<Widget>, ApiError> {
    Ok(Envelope::created_with(Widget {
        id: DocumentId::new(),
        name: body.name,
    }))
}

async fn get_widget() -> Result<Envelope<Widget>, ApiError> {
    Err(ApiError::not_found())
}

async fn duplicate_widget() -> Result<Envelope<Widget>, ApiError> {
    Err(ApiError::conflict())
}

async fn boom() -> Result<Envelope, ApiError> {
    Err(ApiError::internal(
        "connection refused: mongodb://root:hunter2@db:27017",
    ))
}

async fn whoami(
    State(context): State<AppContext>,
    headers: HeaderMap,
) -> Result<Envelope<Value>, ApiError> {
    let claims = auth::authorize(&headers, context.settings().jwt_secret.as_bytes())?;
    Ok(Envelope::ok_with(json!({ "sub": claims.sub })))
}

fn business_routes() -> Router<AppContext> {
    Router::new()
        .route("/api/v1/widgets", post(create_widget))
        .route("/api/v1/widgets/{id}", get(get_widget))
        .route("/api/v1/widgets/{id}/duplicate", post(duplicate_widget))
        .route("/api/v1/boom", get(boom))
        .route("/api/v1/whoami", get(whoami))
}

async fn server() -> TestServer {
    let context = test_context().await;
    TestServer::new(create_app_with(context, business_routes())).unwrap()
}

fn mint_token(secret: &str, sub: &str) -> String {
    let claims = auth::Claims {
        sub: sub.to_string(),
        exp: (Utc::now() + Duration::minutes(10)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn not_found_uses_the_default_detail() {
    let server = server().await;
    let response = server.get("/api/v1/widgets/missing").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({"msg": "not_found", "detail": "resource_not_found"})
    );
}

#[tokio::test]
async fn conflict_uses_the_default_detail() {
    let server = server().await;
    let response = server.post("/api/v1/widgets/w1/duplicate").await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>(),
        json!({"msg": "conflict", "detail": "resource_already_exists"})
    );
}

#[tokio::test]
async fn invalid_token_gets_a_challenge() {
    let server = server().await;
    let response = server
        .get("/api/v1/whoami")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer garbage"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "bad_jwt_token");
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn valid_token_reaches_the_handler() {
    let server = server().await;
    let token = mint_token("test-secret", "skipper");
    let response = server
        .get("/api/v1/whoami")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"msg": "ok", "result": {"sub": "skipper"}})
    );
}

#[tokio::test]
async fn creation_returns_a_created_envelope() {
    let server = server().await;
    let response = server
        .post("/api/v1/widgets")
        .json(&json!({"name": "bollard", "quantity": 3}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "created");
    assert_eq!(body["result"]["name"], "bollard");

    // Opaque ids appear as their stable hex string form.
    let id = body["result"]["id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn validation_failure_reports_every_issue() {
    let server = server().await;
    let response = server
        .post("/api/v1/widgets")
        .json(&json!({"name": "", "quantity": -2}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "bad_request");

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(body["detail"], errors[0]["message"]);
    assert_eq!(errors[1]["context"], "-2");
}

#[tokio::test]
async fn malformed_body_is_a_plain_bad_request() {
    let server = server().await;
    let response = server
        .post("/api/v1/widgets")
        .text("{not json")
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "bad_request");
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn internal_errors_reveal_nothing() {
    let server = server().await;
    let response = server.get("/api/v1/boom").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({"msg": "internal_server_error"})
    );
}

#[tokio::test]
async fn untrusted_host_is_rejected_before_routing() {
    let mut settings = test_settings();
    settings.allowed_hosts = vec!["api.example.com".to_string()];
    let context = test_context_with(settings).await;
    let server = TestServer::new(create_app_with(context, business_routes())).unwrap();

    let response = server
        .get("/health/live")
        .add_header(header::HOST, HeaderValue::from_static("evil.example.org"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "bad_request");
    assert_eq!(body["detail"], "invalid_host_header");
}

#[tokio::test]
async fn cors_mirrors_the_origin_and_allows_credentials() {
    let server = server().await;
    let response = server
        .get("/health/live")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("https://app.example.com"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example.com"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn health_live_answers_without_the_database() {
    let server = server().await;
    let response = server.get("/health/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn readiness_degrades_when_the_database_is_gone() {
    let server = server().await;
    let response = server.get("/health/ready").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let status = response.json::<Value>()["status"].as_str().unwrap().to_string();
    assert!(status.starts_with("not_ready"));
}

#[tokio::test]
async fn openapi_document_reflects_the_settings() {
    let server = server().await;
    let response = server.get("/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let doc = response.json::<Value>();
    assert_eq!(doc["info"]["title"], "Quayside Test");
    assert!(doc["components"]["schemas"].get("ErrorEnvelope").is_some());
}

#[tokio::test]
async fn redoc_page_is_served() {
    let server = server().await;
    let response = server.get("/redoc").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("redoc"));
}

#[tokio::test]
async fn large_bodies_are_gzipped_when_asked() {
    let server = server().await;

    // The OpenAPI document comfortably exceeds the 1024-byte threshold.
    let large = server
        .get("/openapi.json")
        .add_header(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"))
        .await;
    assert_eq!(
        large.headers().get(header::CONTENT_ENCODING).unwrap(),
        "gzip"
    );

    // Small bodies pass through untouched.
    let small = server
        .get("/health/live")
        .add_header(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"))
        .await;
    assert!(small.headers().get(header::CONTENT_ENCODING).is_none());
}
