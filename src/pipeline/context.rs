//! Request-scoped state threaded through the gates.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderValue, Request};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::security::ClaimSet;

pub const X_REQUEST_ID: &str = "x-request-id";

/// What the gates know about one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Correlation id from `x-request-id`, `"unknown"` if absent.
    pub request_id: String,
    /// Raw `Authorization` header value, if the caller sent one. Non-UTF-8
    /// values are kept byte-exact, see [`authorization_key`].
    pub authorization: Option<String>,
    /// Remote address, when the server was started with connect info.
    pub peer: Option<SocketAddr>,
    /// Set by the identity gate, and only after signature and expiry pass.
    pub claims: Option<ClaimSet>,
}

impl RequestContext {
    pub fn from_request(request: &Request<Body>) -> Self {
        let headers = request.headers();
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let authorization = headers
            .get(header::AUTHORIZATION)
            .map(authorization_key);
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Self {
            request_id,
            authorization,
            peer,
            claims: None,
        }
    }

    /// Rate-limit key: the raw header, empty for anonymous callers.
    pub fn caller_id(&self) -> &str {
        self.authorization.as_deref().unwrap_or("")
    }

    pub fn is_anonymous(&self) -> bool {
        self.caller_id().is_empty()
    }
}

/// The header as a string key that is distinct for distinct byte values.
///
/// UTF-8 headers are used verbatim. Anything else is base64 of the raw bytes
/// behind a `\n`, which a valid header value can never contain, so such a
/// key collides with no UTF-8 header and never carries a `Bearer ` prefix.
pub fn authorization_key(value: &HeaderValue) -> String {
    match std::str::from_utf8(value.as_bytes()) {
        Ok(text) => text.to_string(),
        Err(_) => format!("\n{}", STANDARD.encode(value.as_bytes())),
    }
}
