//! Error-to-envelope mapping.
//!
//! [`ApiError`] is the total function from "what went wrong" to a wire
//! envelope plus status code. Handlers return `Result<_, ApiError>` and the
//! [`IntoResponse`] impl is the single translation point; no handler builds
//! an error body by hand.
//!
//! | Variant | Status | `msg` |
//! |---|---|---|
//! | `BadRequest` | 400 | `bad_request` |
//! | `Validation` | 400 | `bad_request` + `errors` |
//! | `BadToken` | 401 | `bad_jwt_token` + `WWW-Authenticate: Bearer` |
//! | `Forbidden` | 403 | `forbidden` |
//! | `NotFound` | 404 | `not_found` |
//! | `Conflict` | 409 | `conflict` |
//! | `Unprocessable` | 422 | `unprocessable_entity` |
//! | `Internal` | 500 | `internal_server_error`, detail withheld |

use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Default detail for a 404 raised without a custom message.
pub const DEFAULT_NOT_FOUND: &str = "resource_not_found";

/// Default detail for a 409 raised without a custom message.
pub const DEFAULT_CONFLICT: &str = "resource_already_exists";

/// Fixed enumeration carried in an error envelope's `msg` field.
///
/// Clients branch on this value; `detail` is human-readable and free-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    BadJwtToken,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    InternalServerError,
}

impl ErrorKind {
    /// The status code documented for this kind.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::BadJwtToken => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One structured description of a failed input constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssue {
    /// Path of the offending field, e.g. `body.items[2].name`.
    pub field_path: String,

    /// Why the constraint failed.
    pub message: String,

    /// Extra context from the originating error. Stringified at
    /// construction: the source value may not itself be safely encodable,
    /// and a second encoding failure while reporting the first would mask
    /// it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ValidationIssue {
    /// Describe a failed constraint on one field.
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Attach debug context, coerced to text.
    pub fn with_context(mut self, context: impl fmt::Debug) -> Self {
        self.context = Some(format!("{context:?}"));
        self
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Stable error kind, see [`ErrorKind`].
    pub msg: ErrorKind,

    /// Human-readable explanation. Always withheld for internal errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Per-field issues, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationIssue>>,
}

/// Everything a request handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or otherwise unusable request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Input schema validation failed; carries one issue per constraint.
    #[error("validation failed ({} issues)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// Invalid or expired auth token.
    #[error("bad jwt token: {0}")]
    BadToken(String),

    /// Authenticated but not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate or conflicting resource.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Well-formed but semantically invalid input.
    #[error("unprocessable entity: {detail}")]
    Unprocessable {
        detail: String,
        issues: Vec<ValidationIssue>,
    },

    /// Catch-all. The source text never reaches the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// 400 with a custom detail.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    /// 404 with the default detail (`resource_not_found`).
    pub fn not_found() -> Self {
        Self::NotFound(DEFAULT_NOT_FOUND.to_string())
    }

    /// 404 with a custom detail.
    pub fn not_found_with(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    /// 409 with the default detail (`resource_already_exists`).
    pub fn conflict() -> Self {
        Self::Conflict(DEFAULT_CONFLICT.to_string())
    }

    /// 409 with a custom detail.
    pub fn conflict_with(detail: impl Into<String>) -> Self {
        Self::Conflict(detail.into())
    }

    /// 422 without per-field issues.
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::Unprocessable {
            detail: detail.into(),
            issues: Vec::new(),
        }
    }

    /// 500 from any displayable source. The text is logged server-side and
    /// never serialized.
    pub fn internal(source: impl fmt::Display) -> Self {
        Self::Internal(source.to_string())
    }

    /// The stable kind this error maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => ErrorKind::BadRequest,
            ApiError::BadToken(_) => ErrorKind::BadJwtToken,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Unprocessable { .. } => ErrorKind::UnprocessableEntity,
            ApiError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// The status code documented for this error.
    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    /// The wire envelope for this error.
    ///
    /// Validation failures report the first issue's message as `detail` and
    /// the full issue list as `errors`. Internal errors carry neither detail
    /// nor issues.
    pub fn envelope(&self) -> ErrorEnvelope {
        let msg = self.kind();
        match self {
            ApiError::BadRequest(detail)
            | ApiError::BadToken(detail)
            | ApiError::Forbidden(detail)
            | ApiError::NotFound(detail)
            | ApiError::Conflict(detail) => ErrorEnvelope {
                msg,
                detail: Some(detail.clone()),
                errors: None,
            },
            ApiError::Validation(issues) => ErrorEnvelope {
                msg,
                detail: issues.first().map(|issue| issue.message.clone()),
                errors: Some(issues.clone()),
            },
            ApiError::Unprocessable { detail, issues } => ErrorEnvelope {
                msg,
                detail: Some(detail.clone()),
                errors: if issues.is_empty() {
                    None
                } else {
                    Some(issues.clone())
                },
            },
            ApiError::Internal(_) => ErrorEnvelope {
                msg,
                detail: None,
                errors: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            // The client sees only the kind; the full text goes to the log.
            tracing::error!(error = %source, "unhandled internal error");
        }

        let status = self.status();
        let challenge = matches!(self, ApiError::BadToken(_));
        let mut response = (status, Json(self.envelope())).into_response();
        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

/// Malformed request bodies surface as plain 400s.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Token decoding failures surface as 401s with the library's message.
impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::BadToken(err.to_string())
    }
}

/// Driver failures are internal: logged in full, reported as nothing.
impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        ApiError::internal(err)
    }
}
