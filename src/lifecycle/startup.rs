//! Startup orchestration.
//!
//! Fail fast: any error here is a [`ConfigError`] and aborts the process
//! before the listener is bound.

use std::path::Path;

use crate::config::{load_or_default, ConfigError, GatewayConfig};
use crate::security::KeyMaterial;

/// Load and validate configuration.
pub fn load_configuration(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_or_default(path)
}

/// Log the settings that shape admission decisions.
pub fn log_configuration(config: &GatewayConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        requests_per_second = config.rate_limit.requests_per_second,
        burst_size = config.rate_limit.burst_size,
        token_ttl_secs = config.auth.token_ttl_secs,
        "Configuration loaded"
    );
}

/// Load key material from the environment and prove the pair works.
pub fn load_keys(config: &GatewayConfig) -> Result<KeyMaterial, ConfigError> {
    let keys = KeyMaterial::from_env(&config.auth)?;
    keys.probe()?;
    tracing::info!(
        private_key_env = %config.auth.private_key_env,
        public_key_env = %config.auth.public_key_env,
        "Key material loaded"
    );
    Ok(keys)
}
