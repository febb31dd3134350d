//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes in range)
//! - Check the redirect target is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid status code {value}")]
    InvalidStatus { field: &'static str, value: u16 },

    #[error("redirect.target: {0}")]
    InvalidTarget(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    let redirect = &config.redirect;
    if redirect.enabled {
        check_status(&mut errors, "redirect.expected_status", redirect.expected_status);
        check_status(&mut errors, "redirect.intended_status", redirect.intended_status);

        match Url::parse(&redirect.target) {
            Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
                errors.push(ValidationError::InvalidTarget(format!(
                    "unsupported scheme {:?}",
                    url.scheme()
                )));
            }
            Ok(url) if url.cannot_be_a_base() || url.host().is_none() => {
                errors.push(ValidationError::InvalidTarget(format!(
                    "{:?} is not an absolute URL with a host",
                    redirect.target
                )));
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(ValidationError::InvalidTarget(format!(
                    "{:?}: {}",
                    redirect.target, e
                )));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_status(errors: &mut Vec<ValidationError>, field: &'static str, value: u16) {
    if StatusCode::from_u16(value).is_err() {
        errors.push(ValidationError::InvalidStatus { field, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirecting(target: &str) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.redirect.enabled = true;
        config.redirect.target = target.to_string();
        config
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_valid_redirect() {
        assert_eq!(validate_config(&redirecting("https://other.host/")), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = redirecting("not a url");
        config.listener.bind_address = "localhost".to_string();
        config.redirect.expected_status = 42;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::InvalidStatus {
            field: "redirect.expected_status",
            value: 42,
        }));
    }

    #[test]
    fn test_rejects_non_http_target() {
        let errors = validate_config(&redirecting("ftp://other.host/")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_disabled_redirect_is_not_checked() {
        let mut config = redirecting("");
        config.redirect.enabled = false;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::Zero("limits.max_body_bytes");
        assert_eq!(err.to_string(), "limits.max_body_bytes must be greater than zero");
    }
}
