//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Enrollment:
//!     Principal → issuer.rs (sign RS512 token with private key)
//!
//! Protected request:
//!     → rate_limit.rs (per-caller token bucket)
//!     → verifier.rs (prefix, parse, algorithm, signature, expiry)
//!     → access_control.rs (exact role match)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Key material is loaded once (keys.rs) and borrowed, never global
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod access_control;
pub mod claims;
pub mod issuer;
pub mod keys;
pub mod rate_limit;
pub mod verifier;

pub use access_control::authorize;
pub use claims::{ClaimSet, Principal};
pub use issuer::{CredentialIssuer, SigningError};
pub use keys::{KeyError, KeyMaterial};
pub use rate_limit::AdmissionLimiter;
pub use verifier::{AuthError, TokenVerifier};
