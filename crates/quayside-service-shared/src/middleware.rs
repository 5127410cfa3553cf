//! Request interceptors.
//!
//! This module provides the hand-rolled members of the middleware chain:
//!
//! - [`trusted_host`]: rejects requests whose `Host` header is not on the
//!   allow-list, short-circuiting the rest of the chain
//! - [`correlate_request`]: extracts `X-Request-ID` or generates a UUID v7
//!   and injects it into the request extensions and the tracing span
//!
//! Both are plain `axum::middleware::from_fn` interceptors; custom ones can
//! be appended the same way. Layers run in registration order on the way in
//! and reverse order on the way out, and any of them may short-circuit by
//! returning a response without calling `next`.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;

/// Newtype wrapper for request correlation IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Wrap an existing ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a time-sortable UUID v7 ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Take the `X-Request-ID` header if present and non-empty, otherwise
/// generate a fresh ID.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(RequestId::new)
        .unwrap_or_else(RequestId::generate)
}

/// Correlation middleware: one tracing span per request, keyed by request ID.
pub async fn correlate_request(mut req: Request, next: Next) -> Response {
    let request_id = extract_or_generate_request_id(req.headers());
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = req.uri().path(),
    );
    req.extensions_mut().insert(request_id);

    async move {
        tracing::debug!("handling request");
        let response = next.run(req).await;
        tracing::info!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await
}

/// Host-header allow-list.
///
/// Patterns are either literal hostnames or leading-wildcard forms like
/// `*.example.com` (matching any subdomain); `*` allows everything. Ports
/// are ignored when matching.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    patterns: Vec<String>,
}

impl AllowedHosts {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| pattern.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// The default allow-everything list.
    pub fn allow_all() -> Self {
        Self::new(["*"])
    }

    /// Whether the given `Host` header value is acceptable.
    pub fn allows(&self, host: &str) -> bool {
        let host = host
            .split(':')
            .next()
            .unwrap_or(host)
            .to_ascii_lowercase();

        self.patterns.iter().any(|pattern| {
            pattern == "*"
                || pattern == &host
                || (pattern.starts_with('*') && host.ends_with(&pattern[1..]))
        })
    }
}

/// Trusted-host middleware: requests from hosts outside the allow-list are
/// answered with a 400 envelope and never reach the rest of the chain.
pub async fn trusted_host(
    State(allowed): State<AllowedHosts>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !allowed.allows(host) {
        tracing::warn!(host, "rejected request from untrusted host");
        return Err(ApiError::bad_request("invalid_host_header"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn request_ids_are_unique_uuids() {
        let first = RequestId::generate();
        let second = RequestId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }

    #[test]
    fn header_id_wins_over_generation() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-7"));
        assert_eq!(extract_or_generate_request_id(&headers).as_str(), "req-7");
    }

    #[test]
    fn empty_header_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static(""));
        assert_eq!(extract_or_generate_request_id(&headers).as_str().len(), 36);
    }

    #[test]
    fn wildcard_allows_anything() {
        let hosts = AllowedHosts::allow_all();
        assert!(hosts.allows("api.example.com"));
        assert!(hosts.allows(""));
    }

    #[test]
    fn literal_hosts_match_exactly_ignoring_port_and_case() {
        let hosts = AllowedHosts::new(["api.example.com"]);
        assert!(hosts.allows("api.example.com"));
        assert!(hosts.allows("API.Example.Com:8080"));
        assert!(!hosts.allows("evil.example.org"));
        assert!(!hosts.allows("example.com"));
    }

    #[test]
    fn leading_wildcard_matches_subdomains() {
        let hosts = AllowedHosts::new(["*.example.com"]);
        assert!(hosts.allows("api.example.com"));
        assert!(hosts.allows("a.b.example.com:443"));
        assert!(!hosts.allows("example.com"));
        assert!(!hosts.allows("notexample.com"));
    }
}
