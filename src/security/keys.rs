//! Signing key material.
//!
//! Both halves arrive as base64-encoded PEM blocks in the environment. They
//! are loaded once at startup into an immutable [`KeyMaterial`] that the
//! issuer and verifier borrow from; any failure here is fatal.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::AuthConfig;
use crate::security::claims::{unix_now, Principal};
use crate::security::issuer::CredentialIssuer;
use crate::security::verifier::TokenVerifier;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("environment variable {0} is not set")]
    Missing(String),
    #[error("environment variable {var} is not valid base64: {source}")]
    Encoding {
        var: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to parse private key: {0}")]
    Private(#[source] jsonwebtoken::errors::Error),
    #[error("failed to parse public key: {0}")]
    Public(#[source] jsonwebtoken::errors::Error),
    #[error("key pair failed the startup probe: {0}")]
    Probe(String),
}

/// RSA key pair used to sign and verify bearer tokens.
#[derive(Clone)]
pub struct KeyMaterial {
    signing: EncodingKey,
    verifying: DecodingKey,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Read both keys from the variables named in `auth`.
    pub fn from_env(auth: &AuthConfig) -> Result<Self, KeyError> {
        let private = read_var(&auth.private_key_env)?;
        let public = read_var(&auth.public_key_env)?;

        let private_pem = decode_var(&auth.private_key_env, &private)?;
        let public_pem = decode_var(&auth.public_key_env, &public)?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Parse PEM-encoded RSA keys (PKCS#1 or PKCS#8 / SPKI).
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, KeyError> {
        let signing = EncodingKey::from_rsa_pem(private_pem).map_err(KeyError::Private)?;
        let verifying = DecodingKey::from_rsa_pem(public_pem).map_err(KeyError::Public)?;
        Ok(Self { signing, verifying })
    }

    pub fn signing_key(&self) -> &EncodingKey {
        &self.signing
    }

    pub fn verifying_key(&self) -> &DecodingKey {
        &self.verifying
    }

    /// Sign and verify a throwaway token.
    ///
    /// PEM parsing alone accepts a private key that cannot sign or a public
    /// key from a different pair; both surface here instead of on the first
    /// enrollment.
    pub fn probe(&self) -> Result<(), KeyError> {
        let issuer = CredentialIssuer::new(self, 60);
        let verifier = TokenVerifier::new(self);
        let probe = Principal::new("startup-probe", "probe");

        let token = issuer
            .issue(&probe)
            .map_err(|e| KeyError::Probe(e.to_string()))?;
        let claims = verifier
            .verify_token_at(&token, unix_now())
            .map_err(|e| KeyError::Probe(e.to_string()))?;

        if claims.username != probe.name {
            return Err(KeyError::Probe("round-tripped claims differ".into()));
        }
        Ok(())
    }
}

fn read_var(name: &str) -> Result<String, KeyError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(KeyError::Missing(name.to_string())),
    }
}

fn decode_var(name: &str, value: &str) -> Result<Vec<u8>, KeyError> {
    let compact: String = value.split_whitespace().collect();
    STANDARD.decode(compact).map_err(|source| KeyError::Encoding {
        var: name.to_string(),
        source,
    })
}
