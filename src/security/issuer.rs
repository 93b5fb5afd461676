//! Credential issuing.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::security::claims::{unix_now, ClaimSet, Principal};
use crate::security::keys::KeyMaterial;

/// Algorithm every issued token is signed with.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS512;

/// The private key could not produce a signature. An operational fault, not
/// a client error.
#[derive(Debug, thiserror::Error)]
#[error("failed to sign token: {0}")]
pub struct SigningError(#[from] jsonwebtoken::errors::Error);

/// Produces signed, time-bounded bearer tokens. Holds no per-call state.
#[derive(Clone)]
pub struct CredentialIssuer {
    key: EncodingKey,
    ttl_secs: u64,
}

impl CredentialIssuer {
    pub fn new(keys: &KeyMaterial, ttl_secs: u64) -> Self {
        Self {
            key: keys.signing_key().clone(),
            ttl_secs,
        }
    }

    /// Sign a token for `principal`. The caller has already checked that
    /// both fields are present.
    pub fn issue(&self, principal: &Principal) -> Result<String, SigningError> {
        self.issue_at(principal, unix_now())
    }

    pub fn issue_at(&self, principal: &Principal, now: u64) -> Result<String, SigningError> {
        let claims = ClaimSet::for_principal(principal, now, self.ttl_secs);
        Ok(encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.key)?)
    }
}
