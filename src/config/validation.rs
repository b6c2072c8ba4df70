//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is reported,
//! not just the first. Chain entries are deliberately not checked: a malformed
//! RPC URL becomes a permanently unhealthy endpoint instead of a startup error.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }
    if config.server.query_timeout_secs == 0 {
        errors.push(ValidationError::new("server.query_timeout_secs", "must be > 0"));
    } else if config.server.query_timeout_secs >= config.server.request_timeout_secs {
        errors.push(ValidationError::new(
            "server.query_timeout_secs",
            format!(
                "must be below server.request_timeout_secs ({})",
                config.server.request_timeout_secs
            ),
        ));
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::new("health_check.interval_secs", "must be > 0"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::new("health_check.timeout_secs", "must be > 0"));
    }
    if config.health_check.warn_threshold == 0 {
        errors.push(ValidationError::new("health_check.warn_threshold", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.registry.enabled {
        if config.registry.address.trim().is_empty() {
            errors.push(ValidationError::new("registry.address", "required when registry is enabled"));
        }
        if config.registry.max_attempts == 0 {
            errors.push(ValidationError::new("registry.max_attempts", "must be > 0"));
        }
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
    use crate::config::schema::ChainConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = GatewayConfig::default();
        config.server.bind_address = "nowhere".into();
        config.health_check.interval_secs = 0;
        config.health_check.timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["server.bind_address", "health_check.interval_secs", "health_check.timeout_secs"]
        );
    }

    #[test]
    fn test_query_timeout_must_undercut_request_timeout() {
        let mut config = GatewayConfig::default();
        config.server.request_timeout_secs = 5;
        config.server.query_timeout_secs = 5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "server.query_timeout_secs");

        config.server.query_timeout_secs = 4;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_registry_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.registry.address = String::new();
        assert!(validate_config(&config).is_ok());

        config.registry.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "registry.address");
    }

    #[test]
    fn test_malformed_rpc_url_is_accepted() {
        let mut config = GatewayConfig::default();
        config.chains.push(ChainConfig {
            chain_id: 3,
            chain_name: "broken".into(),
            rpc_url: "not a url".into(),
        });
        assert!(validate_config(&config).is_ok());
    }
}
