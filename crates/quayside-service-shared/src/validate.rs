//! Request validation.
//!
//! Request types implement [`Validate`]; handlers take [`ValidatedJson<T>`]
//! instead of `Json<T>`. A body that fails to parse maps to a plain 400; a
//! body that parses but violates constraints maps to a validation envelope
//! carrying one [`ValidationIssue`] per failed constraint.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ValidationIssue};

/// Validation for deserialized request types.
///
/// Collect every failed constraint rather than stopping at the first; the
/// envelope reports the full list and uses the first issue's message as its
/// `detail`.
pub trait Validate {
    /// Check all constraints, returning one issue per violation.
    fn validate(&self) -> Result<(), Vec<ValidationIssue>>;
}

/// JSON extractor that also runs [`Validate`].
///
/// # Example
///
/// ```ignore
/// async fn create(ValidatedJson(body): ValidatedJson<CreateWidget>) -> Result<Envelope<Widget>, ApiError> {
///     // `body` is well-formed and valid here
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(ApiError::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Berth {
        name: String,
        length_m: f64,
    }

    impl Validate for Berth {
        fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
            let mut issues = Vec::new();
            if self.name.trim().is_empty() {
                issues.push(ValidationIssue::new("body.name", "must not be empty"));
            }
            if self.length_m <= 0.0 {
                issues.push(
                    ValidationIssue::new("body.length_m", "must be positive")
                        .with_context(self.length_m),
                );
            }
            if issues.is_empty() {
                Ok(())
            } else {
                Err(issues)
            }
        }
    }

    #[test]
    fn valid_input_passes() {
        let berth = Berth {
            name: "north quay".into(),
            length_m: 42.0,
        };
        assert!(berth.validate().is_ok());
    }

    #[test]
    fn each_violated_constraint_yields_one_issue() {
        let berth = Berth {
            name: "".into(),
            length_m: -1.0,
        };
        let issues = berth.validate().unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field_path, "body.name");
        assert_eq!(issues[1].context.as_deref(), Some("-1.0"));
    }

    #[tokio::test]
    async fn extractor_rejects_malformed_json_as_bad_request() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let rejection = ValidatedJson::<Berth>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(rejection, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn extractor_rejects_invalid_input_with_issues() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"name":"","length_m":-1.0}"#))
            .unwrap();

        let rejection = ValidatedJson::<Berth>::from_request(req, &())
            .await
            .unwrap_err();
        match rejection {
            ApiError::Validation(issues) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected rejection: {other:?}"),
        }
    }
}
