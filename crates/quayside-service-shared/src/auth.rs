//! Bearer-token helpers.
//!
//! Token validation itself is delegated to `jsonwebtoken`; this module only
//! extracts the token from the `Authorization` header and funnels every
//! failure into [`ApiError::BadToken`], which the envelope mapper turns
//! into a 401 with a `WWW-Authenticate: Bearer` challenge.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Minimal claims expected once a token has been decoded and verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / principal identifier.
    pub sub: String,
    /// Expiration, seconds since the epoch. Checked by the library.
    pub exp: i64,
}

/// Pull the bearer token out of the `Authorization` header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::BadToken("missing authorization header".to_string()))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::BadToken("authorization header is not valid text".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadToken("expected a bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::BadToken("empty bearer token".to_string()));
    }

    Ok(token)
}

/// Decode and verify an HS256 token.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Extract and decode in one step; the usual entry point for handlers.
pub fn authorize(headers: &HeaderMap, secret: &[u8]) -> Result<Claims, ApiError> {
    decode_token(extract_bearer(headers)?, secret)
}
