//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, eviction batch within capacity)
//! - Check that addresses, paths, origins and the webhook URL are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - A missing webhook URL is not an error; requests answer 503 instead

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if !config.listener.submit_path.starts_with('/') {
        errors.push(ValidationError::new("listener.submit_path", "must start with '/'"));
    }
    if config.listener.submit_path == "/health" {
        errors.push(ValidationError::new("listener.submit_path", "'/health' is reserved"));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }

    for origin in &config.cors.allowed_origins {
        match Url::parse(origin) {
            Ok(url) if url.path() == "/" && !origin.ends_with('/') => {}
            _ => errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("'{}' is not a bare origin (scheme://host[:port])", origin),
            )),
        }
    }

    let rl = &config.rate_limit;
    if rl.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than 0"));
    }
    if rl.window_ms == 0 {
        errors.push(ValidationError::new("rate_limit.window_ms", "must be greater than 0"));
    }
    if rl.max_tracked_clients == 0 {
        errors.push(ValidationError::new("rate_limit.max_tracked_clients", "must be greater than 0"));
    }
    if rl.eviction_batch == 0 || rl.eviction_batch > rl.max_tracked_clients {
        errors.push(ValidationError::new(
            "rate_limit.eviction_batch",
            "must be between 1 and max_tracked_clients",
        ));
    }

    if let Some(webhook) = config.upstream.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) {
        match Url::parse(webhook) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "upstream.webhook_url",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("upstream.webhook_url", e.to_string())),
        }
    }
    if config.upstream.webhook_url_env.is_empty() {
        errors.push(ValidationError::new("upstream.webhook_url_env", "must not be empty"));
    }
    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.timeout_ms", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
