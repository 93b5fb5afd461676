//! Open endpoints: welcome page and enrollment.

use axum::{body::Bytes, extract::State, Json};

use crate::http::error::ApiError;
use crate::http::extract::parse_json_body;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::Principal;

pub async fn home() -> &'static str {
    "Welcome to the records API"
}

/// Exchange `{name, role}` for a signed bearer token.
pub async fn enroll(State(state): State<AppState>, body: Bytes) -> Result<Json<String>, ApiError> {
    let principal: Principal = parse_json_body(&body)?;
    if !principal.is_valid() {
        return Err(ApiError::bad_request("all fields (name and role) are required"));
    }

    let token = state.issuer.issue(&principal)?;
    metrics::record_token_issued();
    tracing::info!(username = %principal.name, role = %principal.role, "Token issued");
    Ok(Json(token))
}
