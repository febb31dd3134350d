//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Static file serving.
    pub files: FilesConfig,

    /// Status-triggered redirect.
    pub redirect: RedirectConfig,

    /// Access logging.
    pub access_log: AccessLogConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory served at `/`.
    pub root: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Redirect configuration.
///
/// When enabled, a response committed with `expected_status` is sent as
/// `intended_status` with `Location` set to `target` plus the request path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Enable the redirect.
    pub enabled: bool,

    /// Base URL of the redirect target (e.g., "http://other.host/").
    pub target: String,

    /// Status that triggers the redirect.
    pub expected_status: u16,

    /// Status sent instead.
    pub intended_status: u16,

    /// Drop the original response body when redirecting.
    pub discard_body: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target: String::new(),
            expected_status: 404,
            intended_status: 307,
            discard_body: false,
        }
    }
}

/// Access log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// Log one line per request with final status and size.
    pub enabled: bool,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self { enabled: true }
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

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(!config.redirect.enabled);
        assert_eq!(config.redirect.expected_status, 404);
        assert_eq!(config.redirect.intended_status, 307);
        assert!(config.access_log.enabled);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_partial_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            [files]
            root = "/srv/www"

            [redirect]
            enabled = true
            target = "http://other.host/"
            "#,
        )
        .unwrap();

        assert_eq!(config.files.root, PathBuf::from("/srv/www"));
        assert!(config.redirect.enabled);
        assert_eq!(config.redirect.target, "http://other.host/");
        assert_eq!(config.redirect.intended_status, 307);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
