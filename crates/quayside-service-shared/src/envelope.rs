//! Success-response envelopes.
//!
//! Every successful response conforms to `{ "msg": "ok" | "created",
//! "result": ... }`, with `result` omitted entirely when the handler
//! produced no value. The generic parameter gives each endpoint a precisely
//! typed envelope in the generated API documentation; at runtime all
//! instantiations behave identically.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mongodb::bson::oid::{self, ObjectId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Fixed success indicator carried in the `msg` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    /// Plain success, HTTP 200.
    Ok,
    /// Resource creation, HTTP 201.
    Created,
}

impl Msg {
    /// The HTTP status code this indicator maps to.
    pub fn status(self) -> StatusCode {
        match self {
            Msg::Ok => StatusCode::OK,
            Msg::Created => StatusCode::CREATED,
        }
    }
}

/// Uniform success envelope.
///
/// # Example
///
/// ```
/// use quayside_service_shared::Envelope;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Widget {
///     name: String,
/// }
///
/// let body = Envelope::created_with(Widget { name: "bollard".into() });
/// let json = serde_json::to_string(&body).unwrap();
/// assert_eq!(json, r#"{"msg":"created","result":{"name":"bollard"}}"#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T = ()> {
    /// Success indicator, `"ok"` or `"created"`.
    pub msg: Msg,

    /// The handler's result value, omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl Envelope<()> {
    /// A bare 200 envelope: `{"msg":"ok"}`.
    pub fn ok() -> Self {
        Self {
            msg: Msg::Ok,
            result: None,
        }
    }

    /// A bare 201 envelope: `{"msg":"created"}`.
    pub fn created() -> Self {
        Self {
            msg: Msg::Created,
            result: None,
        }
    }
}

impl<T> Envelope<T> {
    /// A 200 envelope carrying a result.
    pub fn ok_with(result: T) -> Self {
        Self {
            msg: Msg::Ok,
            result: Some(result),
        }
    }

    /// A 201 envelope carrying a result.
    pub fn created_with(result: T) -> Self {
        Self {
            msg: Msg::Created,
            result: Some(result),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.msg.status(), Json(self)).into_response()
    }
}

/// An empty 204 response, for handlers with nothing to report.
pub fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Opaque database identifier with a stable string wire form.
///
/// MongoDB object ids serialize as `{"$oid": ...}` documents by default;
/// on the API surface they always appear as the 24-character hex string,
/// and the string form of a given id never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// The hex wire form.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// The underlying driver id, for building queries.
    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for DocumentId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl FromStr for DocumentId {
    type Err = oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

impl utoipa::PartialSchema for DocumentId {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::Type::String)
            .description(Some("Opaque database identifier (24-character hex)"))
            .into()
    }
}

impl utoipa::ToSchema for DocumentId {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("DocumentId")
    }
}
