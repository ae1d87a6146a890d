//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the submit, preflight and health handlers
//! - Wire up middleware (request ID, tracing, CORS, security headers, rate limit)
//! - Bind server to listener
//! - Apply configuration reloads without restarting
//! - Validate, sanitize and forward submissions to the webhook

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::request_id;
use crate::http::response::{method_not_allowed, not_found, ErrorKind, RelayError};
use crate::lifecycle::ShutdownSignal;
use crate::security::cors::{cors_middleware, preflight};
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::{rate_limit_middleware, RateLimitPolicy, RateLimiter};
use crate::submission::{sanitize, validate};
use crate::upstream::{UpstreamError, WebhookForwarder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current configuration; replaced wholesale on reload.
    pub config: Arc<ArcSwap<RelayConfig>>,
    pub limiter: Arc<RateLimiter>,
    pub forwarder: Arc<WebhookForwarder>,
}

/// HTTP server for the form relay.
pub struct RelayServer {
    router: Router,
    state: AppState,
}

impl RelayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let limiter = Arc::new(RateLimiter::new(RateLimitPolicy::from(&config.rate_limit)));
        let forwarder = Arc::new(WebhookForwarder::new()?);

        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(config)),
            limiter,
            forwarder,
        };

        let router = Self::build_router(&state.config.load(), state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route(
                &config.listener.submit_path,
                post(submit_handler)
                    .options(preflight)
                    .fallback(method_not_allowed),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
            .route("/health", get(health_handler))
            .fallback(not_found)
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(middleware::from_fn_with_state(state.clone(), security_headers_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .with_state(state)
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` are swapped in for the
    /// next request. The listener address, submit path and body limit are
    /// fixed at startup.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_config(&state, new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for embedding or driving directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a snapshot of the current config.
    pub fn config(&self) -> Arc<RelayConfig> {
        self.state.config.load_full()
    }
}

fn apply_config(state: &AppState, new_config: RelayConfig) {
    let current = state.config.load();
    if current.listener.submit_path != new_config.listener.submit_path
        || current.listener.bind_address != new_config.listener.bind_address
        || current.listener.max_body_size != new_config.listener.max_body_size
    {
        tracing::warn!("Listener settings changed; they take effect after a restart");
    }

    state.limiter.set_policy(RateLimitPolicy::from(&new_config.rate_limit));
    state.config.store(Arc::new(new_config));
    tracing::info!("Configuration reloaded");
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Form submission handler.
async fn submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, RelayError> {
    let request_id = request_id(&headers).to_string();

    match relay_submission(&state, &request_id, body).await {
        Ok(data) => {
            tracing::info!(request_id = %request_id, "Submission forwarded");
            Ok(Json(data))
        }
        Err(error) => {
            let kind = error.kind();
            let status = error.status().as_u16();
            match kind {
                ErrorKind::Client => {
                    tracing::info!(request_id = %request_id, kind = %kind, status, error = %error, "Submission rejected")
                }
                _ => {
                    tracing::error!(request_id = %request_id, kind = %kind, status, error = %error, "Submission failed")
                }
            }
            Err(error)
        }
    }
}

async fn relay_submission(
    state: &AppState,
    request_id: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<Value, RelayError> {
    let config = state.config.load_full();

    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge
        } else {
            RelayError::MalformedBody
        }
    })?;
    let payload: Value = serde_json::from_slice(&bytes).map_err(|_| RelayError::MalformedBody)?;

    validate(&payload)?;
    let clean = sanitize(&payload);

    let url = config
        .upstream
        .resolve_webhook_url()
        .ok_or(UpstreamError::NotConfigured)?;
    let deadline = Duration::from_millis(config.upstream.timeout_ms);

    tracing::debug!(request_id = %request_id, timeout_ms = config.upstream.timeout_ms, "Calling webhook");
    Ok(state.forwarder.forward(&url, &clean, deadline).await?)
}
