//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rates > 0, lifetimes > 0)
//! - Check the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),
    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
    #[error("auth.token_ttl_secs must be greater than zero")]
    TokenTtl,
    #[error("auth.admin_role must not be empty")]
    AdminRole,
    #[error("auth.{0} must name an environment variable")]
    KeyVariable(&'static str),
    #[error("rate_limit.requests_per_second must be greater than zero")]
    RefillRate,
    #[error("rate_limit.burst_size must be greater than zero")]
    BurstSize,
    #[error("rate_limit.idle_ttl_secs ({idle_ttl}) must cover a full bucket refill ({refill}s)")]
    IdleTtl { idle_ttl: u64, refill: u64 },
    #[error("rate_limit.sweep_interval_secs must be greater than zero")]
    SweepInterval,
    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let auth = &config.auth;
    if auth.token_ttl_secs == 0 {
        errors.push(ValidationError::TokenTtl);
    }
    if auth.admin_role.is_empty() {
        errors.push(ValidationError::AdminRole);
    }
    if auth.private_key_env.is_empty() {
        errors.push(ValidationError::KeyVariable("private_key_env"));
    }
    if auth.public_key_env.is_empty() {
        errors.push(ValidationError::KeyVariable("public_key_env"));
    }

    let limits = &config.rate_limit;
    if limits.requests_per_second == 0 {
        errors.push(ValidationError::RefillRate);
    }
    if limits.burst_size == 0 {
        errors.push(ValidationError::BurstSize);
    }
    if limits.requests_per_second > 0 {
        // Evicting a bucket is only invisible once it would have refilled anyway.
        let refill = u64::from(limits.burst_size).div_ceil(u64::from(limits.requests_per_second));
        if limits.idle_ttl_secs < refill {
            errors.push(ValidationError::IdleTtl {
                idle_ttl: limits.idle_ttl_secs,
                refill,
            });
        }
    }
    if limits.sweep_interval_secs == 0 {
        errors.push(ValidationError::SweepInterval);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.auth.token_ttl_secs = 0;
        config.auth.admin_role.clear();
        config.rate_limit.burst_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::TokenTtl));
        assert!(errors.contains(&ValidationError::AdminRole));
        assert!(errors.contains(&ValidationError::BurstSize));
    }

    #[test]
    fn test_idle_ttl_shorter_than_refill() {
        let mut config = GatewayConfig::default();
        config.rate_limit.requests_per_second = 1;
        config.rate_limit.burst_size = 30;
        config.rate_limit.idle_ttl_secs = 10;

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::IdleTtl { idle_ttl: 10, refill: 30 }])
        );
    }
}
