//! Bearer token verification.
//!
//! Every step is a hard gate, checked in order:
//! 1. `Bearer ` prefix present and token non-empty
//! 2. token parses (three segments, decodable header)
//! 3. header algorithm is in the RSA family (any other `alg`, including
//!    `none` and names jsonwebtoken does not model, is a wrong algorithm)
//! 4. signature verifies against the public key
//! 5. `exp` is strictly in the future (no leeway)
//!
//! Verification is a pure function of the bearer string, the public key and
//! the current time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::security::claims::{unix_now, ClaimSet};
use crate::security::keys::KeyMaterial;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing or invalid Authorization header")]
    MissingCredential,
    #[error("token is malformed")]
    Malformed,
    #[error("invalid token signing method")]
    WrongAlgorithm,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token is expired")]
    Expired,
}

impl AuthError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::Malformed => "malformed",
            AuthError::WrongAlgorithm => "wrong_algorithm",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
        }
    }
}

/// Validates bearer tokens against the public half of the key pair.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(keys: &KeyMaterial) -> Self {
        Self {
            key: keys.verifying_key().clone(),
        }
    }

    /// Verify the value of an `Authorization` header.
    pub fn verify(&self, authorization: &str) -> Result<ClaimSet, AuthError> {
        self.verify_at(authorization, unix_now())
    }

    pub fn verify_at(&self, authorization: &str, now: u64) -> Result<ClaimSet, AuthError> {
        let token = strip_bearer(authorization).ok_or(AuthError::MissingCredential)?;
        self.verify_token_at(token, now)
    }

    /// Verify a bare token (no `Bearer ` prefix).
    pub fn verify_token_at(&self, token: &str, now: u64) -> Result<ClaimSet, AuthError> {
        if token.split('.').count() != 3 {
            return Err(AuthError::Malformed);
        }
        let header = decode_header(token).map_err(|_| classify_unknown_header(token))?;

        if !is_rsa_family(header.alg) {
            return Err(AuthError::WrongAlgorithm);
        }

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<ClaimSet>(token, &self.key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                ErrorKind::InvalidAlgorithm => AuthError::WrongAlgorithm,
                _ => AuthError::Malformed,
            })?
            .claims;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

/// Token part of a `Bearer <token>` header, if any.
pub fn strip_bearer(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

fn is_rsa_family(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512)
}

/// A header jsonwebtoken refused. If it is still JSON naming a non-RSA
/// `alg` (e.g. `none`), that is a substitution attempt, not garbage.
fn classify_unknown_header(token: &str) -> AuthError {
    let alg = token
        .split('.')
        .next()
        .and_then(|segment| URL_SAFE_NO_PAD.decode(segment).ok())
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
        .and_then(|header| header.get("alg").and_then(Value::as_str).map(str::to_owned));

    match alg {
        Some(alg) if !matches!(alg.as_str(), "RS256" | "RS384" | "RS512") => {
            AuthError::WrongAlgorithm
        }
        _ => AuthError::Malformed,
    }
}
