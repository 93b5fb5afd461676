//! The three admission gates.

use std::sync::Arc;

use crate::config::AnonymousPolicy;
use crate::http::error::ApiError;
use crate::pipeline::{Gate, GateDecision, RequestContext};
use crate::security::{authorize, AdmissionLimiter, TokenVerifier};

/// Per-caller token bucket check.
pub struct RateLimitGate {
    limiter: Arc<AdmissionLimiter>,
    anonymous: AnonymousPolicy,
}

impl RateLimitGate {
    pub fn new(limiter: Arc<AdmissionLimiter>, anonymous: AnonymousPolicy) -> Self {
        Self { limiter, anonymous }
    }

    fn key(&self, ctx: &RequestContext) -> String {
        match (self.anonymous, ctx.peer) {
            (AnonymousPolicy::PerPeer, Some(peer)) if ctx.is_anonymous() => {
                format!("anonymous:{}", peer.ip())
            }
            _ => ctx.caller_id().to_string(),
        }
    }
}

impl Gate for RateLimitGate {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn evaluate(&self, ctx: &mut RequestContext) -> GateDecision {
        if self.limiter.allow(&self.key(ctx)) {
            GateDecision::Allow
        } else {
            GateDecision::Deny(ApiError::RateLimited)
        }
    }
}

/// Bearer token verification. Attaches the claim set on success.
pub struct IdentityGate {
    verifier: Arc<TokenVerifier>,
}

impl IdentityGate {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl Gate for IdentityGate {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn evaluate(&self, ctx: &mut RequestContext) -> GateDecision {
        match self.verifier.verify(ctx.caller_id()) {
            Ok(claims) => {
                ctx.claims = Some(claims);
                GateDecision::Allow
            }
            Err(e) => GateDecision::Deny(ApiError::Unauthorized(e)),
        }
    }
}

/// Exact role match against the attached claim set.
pub struct RoleGate {
    required_role: String,
}

impl RoleGate {
    pub fn new(required_role: impl Into<String>) -> Self {
        Self {
            required_role: required_role.into(),
        }
    }
}

impl Gate for RoleGate {
    fn name(&self) -> &'static str {
        "role"
    }

    fn evaluate(&self, ctx: &mut RequestContext) -> GateDecision {
        if authorize(ctx.claims.as_ref(), &self.required_role) {
            GateDecision::Allow
        } else {
            GateDecision::Deny(ApiError::Forbidden)
        }
    }
}
