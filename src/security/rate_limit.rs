//! Per-client sliding-window rate limiting.
//!
//! Protects the upstream webhook, which has its own call quota, from bursts.
//! The limiter is best-effort: it lives in one process, forgets everything
//! on restart, and an address-rotating client walks straight through it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::http::request::client_address;
use crate::http::response::RelayError;
use crate::http::server::AppState;

/// Limits applied by a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Allowed requests per client within one window.
    pub max_requests: usize,
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Distinct clients tracked before eviction.
    pub max_tracked_clients: usize,
    /// Oldest-inserted clients dropped per eviction.
    pub eviction_batch: usize,
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window_ms: config.window_ms,
            max_tracked_clients: config.max_tracked_clients,
            eviction_batch: config.eviction_batch,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

struct Windows {
    policy: RateLimitPolicy,
    /// Client → timestamps (ms since epoch) of allowed requests, oldest first.
    by_client: HashMap<String, VecDeque<u64>>,
    /// Clients in first-seen order; drives eviction.
    insertion_order: VecDeque<String>,
}

/// Sliding-window limiter keyed by client address.
///
/// Denied attempts are not recorded. When more than `max_tracked_clients`
/// addresses are tracked, the `eviction_batch` oldest-inserted ones are
/// dropped even if still active, which only resets their window early.
pub struct RateLimiter {
    inner: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            inner: Mutex::new(Windows {
                policy,
                by_client: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
        }
    }

    /// Check and record a request from `client` at the current time.
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, now_ms())
    }

    /// Check and record a request from `client` at `now_ms`.
    pub fn allow_at(&self, client: &str, now_ms: u64) -> bool {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let windows = &mut *guard;
        let policy = windows.policy;

        if let Some(stamps) = windows.by_client.get_mut(client) {
            while stamps
                .front()
                .is_some_and(|&t| now_ms.saturating_sub(t) >= policy.window_ms)
            {
                stamps.pop_front();
            }
            if stamps.len() >= policy.max_requests {
                return false;
            }
            stamps.push_back(now_ms);
            return true;
        }

        if policy.max_requests == 0 {
            return false;
        }
        windows.by_client.insert(client.to_string(), VecDeque::from([now_ms]));
        windows.insertion_order.push_back(client.to_string());

        if windows.by_client.len() > policy.max_tracked_clients {
            let evicted = policy.eviction_batch.min(windows.insertion_order.len());
            for key in windows.insertion_order.drain(..evicted) {
                windows.by_client.remove(&key);
            }
            tracing::debug!(evicted, tracked = windows.by_client.len(), "Rate limiter evicted oldest clients");
        }

        true
    }

    /// Number of distinct clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).by_client.len()
    }

    /// Replace the policy, keeping recorded windows.
    pub fn set_policy(&self, policy: RateLimitPolicy) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).policy = policy;
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).policy
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Middleware applying the limiter to form submissions.
///
/// Only POST is counted: preflights and rejected methods pass through to
/// their own handlers untouched.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::POST || !state.config.load().rate_limit.enabled {
        return next.run(request).await;
    }

    let client = client_address(request.headers());
    if state.limiter.allow(&client) {
        next.run(request).await
    } else {
        let error = RelayError::RateLimited;
        tracing::warn!(client = %client, kind = %error.kind(), "Rate limit exceeded");
        error.into_response()
    }
}
