//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Placeholder signing secret. Validation warns when it is left in place.
pub const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Token signing and account rules.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        self.bind_address = format!("{}:{}", host, port);
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
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

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,

    /// `iss` claim written to and required on every token.
    pub issuer: String,

    /// `aud` claim written to and required on every token.
    pub audience: String,

    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,

    /// Minimum accepted password length at signup.
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            jwt_secret: PLACEHOLDER_SECRET.to_string(),
            issuer: "api-gateway".to_string(),
            audience: "api-gateway-clients".to_string(),
            token_ttl_secs: 3600,
            min_password_len: 6,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.security.max_body_size, 2 * 1024 * 1024);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "s3cret-s3cret-s3cret-s3cret"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.jwt_secret, "s3cret-s3cret-s3cret-s3cret");
        assert_eq!(config.auth.issuer, "api-gateway");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_set_port_keeps_host() {
        let mut listener = ListenerConfig {
            bind_address: "127.0.0.1:3000".to_string(),
        };
        listener.set_port(8088);
        assert_eq!(listener.bind_address, "127.0.0.1:8088");
    }
}
