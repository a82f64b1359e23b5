//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the backend origin (http or https) and header names
//! - Check audit prefixes are absolute paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("backend.origin `{value}` is invalid: {reason}")]
    InvalidBackendOrigin { value: String, reason: String },

    #[error("cors.allowed_origin `{0}` is not a valid header value")]
    InvalidAllowedOrigin(String),

    #[error("cors.identity_header `{0}` is not a valid header name")]
    InvalidIdentityHeader(String),

    #[error("audit.prefixes entry `{0}` must start with '/'")]
    InvalidAuditPrefix(String),

    #[error("audit.log_path must not be empty when auditing is enabled")]
    MissingAuditLogPath,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(reason) = check_origin(&config.backend.origin) {
        errors.push(ValidationError::InvalidBackendOrigin {
            value: config.backend.origin.clone(),
            reason,
        });
    }

    if HeaderValue::from_str(&config.cors.allowed_origin).is_err() {
        errors.push(ValidationError::InvalidAllowedOrigin(
            config.cors.allowed_origin.clone(),
        ));
    }

    if HeaderName::from_bytes(config.cors.identity_header.as_bytes()).is_err()
        || HeaderValue::from_str(&config.cors.identity_header).is_err()
    {
        errors.push(ValidationError::InvalidIdentityHeader(
            config.cors.identity_header.clone(),
        ));
    }

    for prefix in &config.audit.prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidAuditPrefix(prefix.clone()));
        }
    }

    if config.audit.enabled && config.audit.log_path.trim().is_empty() {
        errors.push(ValidationError::MissingAuditLogPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(origin: &str) -> Result<(), String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}
