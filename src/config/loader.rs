//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::security::keys::KeyError;

/// Fatal startup error. Never produced while serving requests.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
    #[error("Key material: {0}")]
    Keys(#[from] KeyError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load from `path` when given, otherwise validate and return the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_invalid_values() {
        let err = parse_config("[rate_limit]\nrequests_per_second = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::RefillRate));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(matches!(
            parse_config("[listener\nbind_address = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/gateway.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_message_lists_all_errors() {
        let err = parse_config("[auth]\ntoken_ttl_secs = 0\nadmin_role = \"\"\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("token_ttl_secs"));
        assert!(message.contains("admin_role"));
    }
}
