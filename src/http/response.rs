//! Response shaping.
//!
//! # Responsibilities
//! - Map every failure to exactly one status code and JSON body
//! - Keep internal detail (upstream bodies, URLs) out of client messages
//! - Classify failures for the logs
//!
//! # Design Decisions
//! - Client-facing messages are French, matching the website
//! - Success bodies are the webhook's JSON, untouched
//! - CORS and security headers are added by middleware, so every path
//!   (including errors produced here) gets them

use std::fmt;

use axum::{
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::http::request::request_id;
use crate::submission::ValidationError;
use crate::upstream::UpstreamError;

/// Failure classification, used for logging and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad method, path or payload.
    Client,
    RateLimit,
    UpstreamTimeout,
    /// Webhook URL missing, or the webhook served an HTML error page.
    UpstreamConfig,
    /// Webhook unreachable or answered with something unusable.
    UpstreamProtocol,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Client => "client",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::UpstreamTimeout => "upstream_timeout",
            ErrorKind::UpstreamConfig => "upstream_config",
            ErrorKind::UpstreamProtocol => "upstream_protocol",
        })
    }
}

/// Every way a relay request can fail.
///
/// `Display` is the operator-facing description; [`RelayError::public_message`]
/// is what the visitor sees.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("no such route")]
    NotFound,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request body is not valid JSON")]
    MalformedBody,

    #[error("request body exceeds the size limit")]
    PayloadTooLarge,

    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::MethodNotAllowed
            | RelayError::NotFound
            | RelayError::MalformedBody
            | RelayError::PayloadTooLarge
            | RelayError::Invalid(_) => ErrorKind::Client,
            RelayError::RateLimited => ErrorKind::RateLimit,
            RelayError::Upstream(e) => match e {
                UpstreamError::Timeout(_) => ErrorKind::UpstreamTimeout,
                UpstreamError::NotConfigured | UpstreamError::HtmlResponse { .. } => ErrorKind::UpstreamConfig,
                UpstreamError::InvalidResponse { .. } | UpstreamError::Transport(_) => ErrorKind::UpstreamProtocol,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::MalformedBody | RelayError::Invalid(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Upstream(_) => match self.kind() {
                ErrorKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::UpstreamConfig => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// The message shown to the visitor.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::MethodNotAllowed => "Méthode non autorisée".into(),
            RelayError::NotFound => "Ressource introuvable".into(),
            RelayError::RateLimited => "Trop de requêtes. Attendez une minute.".into(),
            RelayError::MalformedBody => ValidationError::NotAnObject.to_string(),
            RelayError::PayloadTooLarge => "Requête trop volumineuse".into(),
            RelayError::Invalid(e) => e.to_string(),
            RelayError::Upstream(e) => match e {
                UpstreamError::NotConfigured => "Service temporairement indisponible".into(),
                UpstreamError::HtmlResponse { .. } => "Erreur de configuration du serveur".into(),
                UpstreamError::Timeout(_) => "Le serveur met trop de temps à répondre".into(),
                UpstreamError::InvalidResponse { .. } | UpstreamError::Transport(_) => {
                    "Une erreur est survenue".into()
                }
            },
        }
    }
}

/// Error body: `{"status":"error","error":"..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Fallback for unknown paths.
pub async fn not_found(method: Method, uri: Uri, headers: HeaderMap) -> RelayError {
    log_rejection(RelayError::NotFound, &method, &uri, &headers)
}

/// Fallback for methods the submit route does not serve.
pub async fn method_not_allowed(method: Method, uri: Uri, headers: HeaderMap) -> RelayError {
    log_rejection(RelayError::MethodNotAllowed, &method, &uri, &headers)
}

fn log_rejection(error: RelayError, method: &Method, uri: &Uri, headers: &HeaderMap) -> RelayError {
    tracing::info!(
        request_id = %request_id(headers),
        method = %method,
        path = %uri.path(),
        kind = %error.kind(),
        status = error.status().as_u16(),
        error = %error,
        "Request rejected"
    );
    error
}
