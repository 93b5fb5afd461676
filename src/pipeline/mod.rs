//! Admission pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → recovery.rs (catch panics, outermost)
//!     → RateLimitGate   ─deny→ 429
//!     → IdentityGate    ─deny→ 401   (attaches ClaimSet)
//!     → RoleGate        ─deny→ 403
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Gates are objects in an explicit ordered list, not nested closures
//! - The first denying gate writes the response; later gates never run
//! - Different route groups get different pipelines (e.g. with or without
//!   a role gate)

pub mod context;
pub mod gates;
pub mod recovery;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

pub use context::RequestContext;
pub use gates::{IdentityGate, RateLimitGate, RoleGate};

use crate::config::AnonymousPolicy;
use crate::http::error::ApiError;
use crate::observability::metrics;
use crate::security::{AdmissionLimiter, TokenVerifier};

/// Outcome of one gate.
#[derive(Debug)]
pub enum GateDecision {
    Allow,
    Deny(ApiError),
}

/// A pipeline stage that either forwards the request or stops it.
///
/// Gates are synchronous: none of them perform I/O.
pub trait Gate: Send + Sync {
    /// Stable name for logs and metrics.
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &mut RequestContext) -> GateDecision;
}

/// Ordered list of gates run in front of a handler.
#[derive(Clone, Default)]
pub struct Pipeline {
    gates: Vec<Arc<dyn Gate>>,
}

impl Pipeline {
    /// A pipeline with no gates: only the recovery wrapper applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a gate; it runs after every gate already present.
    pub fn with_gate(mut self, gate: impl Gate + 'static) -> Self {
        self.gates.push(Arc::new(gate));
        self
    }

    /// Limiter (when given) followed by the verifier.
    pub fn authenticated(
        limiter: Option<(Arc<AdmissionLimiter>, AnonymousPolicy)>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        let mut pipeline = Self::new();
        if let Some((limiter, anonymous)) = limiter {
            pipeline = pipeline.with_gate(RateLimitGate::new(limiter, anonymous));
        }
        pipeline.with_gate(IdentityGate::new(verifier))
    }

    /// This pipeline plus an exact role requirement at the end.
    pub fn require_role(self, role: impl Into<String>) -> Self {
        self.with_gate(RoleGate::new(role))
    }

    pub fn gate_names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    /// Run every gate in order, stopping at the first denial.
    pub fn admit(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        for gate in &self.gates {
            if let GateDecision::Deny(rejection) = gate.evaluate(ctx) {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    gate = gate.name(),
                    reason = rejection.reason(),
                    "Request rejected"
                );
                metrics::record_rejection(gate.name(), rejection.reason());
                return Err(rejection);
            }
        }
        Ok(())
    }
}

/// axum middleware running `pipeline` around the rest of the chain.
///
/// On admission the verified [`ClaimSet`](crate::security::ClaimSet) is
/// placed in the request extensions for the handler.
pub async fn admission(
    State(pipeline): State<Pipeline>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut ctx = RequestContext::from_request(&request);
    let request_id = ctx.request_id.clone();

    recovery::recover(&request_id, async move {
        match pipeline.admit(&mut ctx) {
            Ok(()) => {
                if let Some(claims) = ctx.claims.take() {
                    request.extensions_mut().insert(claims);
                }
                next.run(request).await
            }
            Err(rejection) => rejection.into_response(),
        }
    })
    .await
}
