//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admission gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Credential issuing and verification settings.
    pub auth: AuthConfig,

    /// Per-caller admission limits.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Token issuing and verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Environment variable holding the base64-encoded PEM private key.
    pub private_key_env: String,

    /// Environment variable holding the base64-encoded PEM public key.
    pub public_key_env: String,

    /// Token lifetime in seconds. Tokens cannot be refreshed.
    pub token_ttl_secs: u64,

    /// Role required by mutating record operations.
    pub admin_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            private_key_env: "JWT_PRIVATE_KEY_B64".to_string(),
            public_key_env: "JWT_PUBLIC_KEY_B64".to_string(),
            token_ttl_secs: 24 * 60 * 60,
            admin_role: "admin".to_string(),
        }
    }
}

/// How callers without an Authorization header are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnonymousPolicy {
    /// All anonymous traffic shares the bucket keyed by the empty identifier.
    #[default]
    Shared,
    /// Anonymous callers are keyed by their remote IP address.
    PerPeer,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Sustained requests per second per caller.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,

    /// Buckets untouched for this long are evicted.
    pub idle_ttl_secs: u64,

    /// How often the idle sweep runs.
    pub sweep_interval_secs: u64,

    /// Bucketing of unauthenticated callers.
    pub anonymous: AnonymousPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 2,
            burst_size: 10,
            idle_ttl_secs: 600,
            sweep_interval_secs: 60,
            anonymous: AnonymousPolicy::Shared,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:4000");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert_eq!(config.rate_limit.requests_per_second, 2);
        assert_eq!(config.rate_limit.burst_size, 10);
        assert_eq!(config.rate_limit.anonymous, AnonymousPolicy::Shared);
    }

    #[test]
    fn test_partial_section_override() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [rate_limit]
            burst_size = 20
            anonymous = "per_peer"
            "#,
        )
        .unwrap();
        assert_eq!(config.rate_limit.burst_size, 20);
        assert_eq!(config.rate_limit.requests_per_second, 2);
        assert_eq!(config.rate_limit.anonymous, AnonymousPolicy::PerPeer);
    }
}
