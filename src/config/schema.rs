//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the form relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, submit path, body cap).
    pub listener: ListenerConfig,

    /// Cross-origin policy for browser callers.
    pub cors: CorsConfig,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Upstream webhook settings.
    pub upstream: UpstreamConfig,

    /// Response hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path the form posts to.
    pub submit_path: String,

    /// Maximum accepted request body, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            submit_path: "/submit".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to read relay responses (exact match).
    pub allowed_origins: Vec<String>,

    /// Preflight cache lifetime advertised to browsers. `None` omits the header.
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://webfast-dz.vercel.app".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
            max_age_secs: Some(86_400),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum allowed submissions per client within one window.
    pub max_requests: usize,

    /// Sliding window length in milliseconds.
    pub window_ms: u64,

    /// Number of distinct client addresses tracked before eviction kicks in.
    pub max_tracked_clients: usize,

    /// How many of the oldest-inserted addresses are dropped per eviction.
    pub eviction_batch: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window_ms: 60_000,
            max_tracked_clients: 1000,
            eviction_batch: 100,
        }
    }
}

/// Upstream webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Webhook URL. When unset, `webhook_url_env` is consulted per request.
    pub webhook_url: Option<String>,

    /// Environment variable holding the webhook URL.
    pub webhook_url_env: String,

    /// Deadline for the whole upstream exchange, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_url_env: "GOOGLE_APPS_SCRIPT_URL".to_string(),
            timeout_ms: 25_000,
        }
    }
}

impl UpstreamConfig {
    /// Resolve the webhook URL for the current request.
    ///
    /// Read every time so that a deployment can set the variable without a
    /// restart. Blank values count as unset.
    pub fn resolve_webhook_url(&self) -> Option<String> {
        self.resolve_webhook_url_with(|key| std::env::var(key).ok())
    }

    /// Like [`resolve_webhook_url`](Self::resolve_webhook_url), reading the
    /// fallback variable through `lookup`.
    pub fn resolve_webhook_url_with<F>(&self, lookup: F) -> Option<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        self.webhook_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| lookup(&self.webhook_url_env).filter(|u| !u.trim().is_empty()))
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Attach `X-Content-Type-Options` and `X-Frame-Options` to every response.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
