//! Extractors for admitted requests.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;

use crate::http::error::ApiError;
use crate::security::{AuthError, ClaimSet};

/// Verified identity attached by the identity gate.
///
/// Rejects with 401 when no claim set is present, so a handler mounted
/// without the gate fails closed.
#[derive(Debug, Clone)]
pub struct Identity(pub ClaimSet);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClaimSet>()
            .cloned()
            .map(Identity)
            .ok_or(ApiError::Unauthorized(AuthError::MissingCredential))
    }
}

/// Decode a JSON body with the enrollment-style error messages.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("no data found"));
    }
    serde_json::from_slice(body).map_err(|_| ApiError::bad_request("invalid data"))
}
