//! Mapping of request failures to HTTP responses.
//!
//! | Error | Status | Body |
//! |---|---|---|
//! | `BadRequest` | 400 | JSON string |
//! | `Unauthorized` | 401 | JSON string |
//! | `Forbidden` | 403 | `"forbidden"` |
//! | `NotFound` | 404 | JSON string |
//! | `RateLimited` | 429 | `{"error": "Too many requests"}` |
//! | `Internal` | 500 | `"internal server error"`, detail only logged |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::security::{AuthError, SigningError};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("Too many requests")]
    RateLimited,
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(e) => e.reason(),
            ApiError::Forbidden => "role_mismatch",
            ApiError::NotFound(_) => "not_found",
            ApiError::RateLimited => "rate_limited",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(e: SigningError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::RateLimited => {
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            ApiError::Internal(ref detail) => {
                tracing::error!(detail = %detail, "Internal error");
                (status, Json(self.to_string())).into_response()
            }
            _ => (status, Json(self.to_string())).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rate_limited_body_is_object() {
        let (status, body) = body_json(ApiError::RateLimited).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({ "error": "Too many requests" }));
    }

    #[tokio::test]
    async fn test_forbidden_body_is_string() {
        let (status, body) = body_json(ApiError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!("forbidden"));
    }

    #[tokio::test]
    async fn test_unauthorized_carries_reason() {
        let (status, body) = body_json(ApiError::Unauthorized(AuthError::Expired)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!("token is expired"));
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let (status, body) = body_json(ApiError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!("internal server error"));
    }
}
