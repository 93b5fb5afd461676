//! Principals and verified claim sets.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Enrollment record submitted by an unauthenticated caller.
///
/// Not trusted by itself: it only becomes an identity once the issuer has
/// signed a token for it and the verifier has accepted that token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Principal {
    pub name: String,
    pub role: String,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    /// Both fields are required for enrollment.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.role.is_empty()
    }
}

/// Decoded contents of a verified token.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClaimSet {
    pub username: String,
    pub role: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
    /// Any further claims carried by the token.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ClaimSet {
    /// Claims for `principal`, valid for `ttl_secs` from `now`.
    pub fn for_principal(principal: &Principal, now: u64, ttl_secs: u64) -> Self {
        Self {
            username: principal.name.clone(),
            role: principal.role.clone(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
            extra: serde_json::Map::new(),
        }
    }

    /// Expiry is exclusive: a token is dead at exactly `exp`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.exp
    }
}

/// Current time in whole seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
