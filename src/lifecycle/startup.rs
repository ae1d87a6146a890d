//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging
//! - Start the config watcher and signal handler
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing webhook URL is not a startup error
//! - Listener binds last (traffic only when ready)

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, watcher::ConfigWatcher, ConfigError, RelayConfig};
use crate::http::RelayServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::logging;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("config watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start the relay and run until a termination signal arrives.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("form-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let webhook_configured = config.upstream.resolve_webhook_url().is_some();
    tracing::info!(
        bind_address = %config.listener.bind_address,
        submit_path = %config.listener.submit_path,
        allowed_origins = config.cors.allowed_origins.len(),
        rate_limit = config.rate_limit.enabled,
        upstream_timeout_ms = config.upstream.timeout_ms,
        webhook_configured,
        "Configuration loaded"
    );
    if !webhook_configured {
        tracing::warn!(
            env = %config.upstream.webhook_url_env,
            "Webhook URL not set; submissions will be answered with 503 until it is"
        );
    }

    // Keep the watcher handle alive for the lifetime of the server.
    let (_watcher, config_updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let address = config.listener.bind_address.clone();
    let server = RelayServer::new(config)?;
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    server
        .run(listener, config_updates, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
