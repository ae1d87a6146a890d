//! Delivery of sanitized submissions to the Apps Script webhook.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::resilience::with_deadline;
use crate::submission::SanitizedPayload;

/// How much of an unparseable body is kept for the logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Failure to obtain a usable answer from the webhook.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("webhook URL is not configured")]
    NotConfigured,

    #[error("webhook did not answer within {0:?}")]
    Timeout(Duration),

    /// The platform served an HTML page instead of the script's JSON. This is
    /// what a wrong deployment URL or a permission problem looks like.
    #[error("webhook returned an HTML document (status {status}); check the deployment and its access settings")]
    HtmlResponse { status: u16 },

    #[error("webhook returned a non-JSON body (status {status}): {source}; body starts with {preview:?}")]
    InvalidResponse {
        status: u16,
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Posts submissions to the webhook. One attempt per call, never retried.
#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    client: Client,
}

impl WebhookForwarder {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }

    /// Forward `payload` to `url` and return the webhook's JSON answer.
    ///
    /// The whole exchange (connect, redirects, body) must finish before
    /// `deadline`; otherwise the request is dropped and
    /// [`UpstreamError::Timeout`] is returned. The webhook's HTTP status does
    /// not decide success: its JSON body carries the application outcome.
    pub async fn forward(
        &self,
        url: &str,
        payload: &SanitizedPayload,
        deadline: Duration,
    ) -> Result<Value, UpstreamError> {
        with_deadline(deadline, self.exchange(url, payload))
            .await
            .map_err(|_| UpstreamError::Timeout(deadline))?
    }

    async fn exchange(&self, url: &str, payload: &SanitizedPayload) -> Result<Value, UpstreamError> {
        let response = self.client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        tracing::info!(status, "Webhook answered");

        let text = response.text().await?;
        interpret_body(status, &text)
    }
}

/// Parse the webhook's body, classifying what cannot be parsed.
///
/// The body is read as text first because Apps Script answers with an HTML
/// error page, not JSON, when the deployment is misconfigured. That case is
/// singled out so it reaches the operator as a configuration problem; any
/// other unparseable body is an invalid response.
pub fn interpret_body(status: u16, text: &str) -> Result<Value, UpstreamError> {
    serde_json::from_str(text).map_err(|source| {
        if looks_like_html(text) {
            UpstreamError::HtmlResponse { status }
        } else {
            UpstreamError::InvalidResponse {
                status,
                preview: text.chars().take(BODY_PREVIEW_CHARS).collect(),
                source,
            }
        }
    })
}

fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype") || lower.contains("<html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_passes_through() {
        let value = interpret_body(200, r#"{"status":"success","id":"1"}"#).unwrap();
        assert_eq!(value, json!({"status": "success", "id": "1"}));
    }

    #[test]
    fn test_status_does_not_decide_success() {
        let value = interpret_body(500, r#"{"status":"error","message":"sheet locked"}"#).unwrap();
        assert_eq!(value["status"], "error");
    }

    #[test]
    fn test_html_is_configuration_error() {
        for body in [
            "<!DOCTYPE html><html><body>Sorry, unable to open the file</body></html>",
            "<HTML><head></head></HTML>",
            "\n  <html lang=\"en\">",
        ] {
            assert!(matches!(interpret_body(200, body), Err(UpstreamError::HtmlResponse { status: 200 })), "{body}");
        }
    }

    #[test]
    fn test_other_garbage_is_invalid_response() {
        let err = interpret_body(200, "Service Unavailable").unwrap_err();
        match err {
            UpstreamError::InvalidResponse { status, preview, .. } => {
                assert_eq!(status, 200);
                assert_eq!(preview, "Service Unavailable");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_preview_is_bounded() {
        let err = interpret_body(502, &"x".repeat(1000)).unwrap_err();
        match err {
            UpstreamError::InvalidResponse { preview, .. } => assert_eq!(preview.len(), BODY_PREVIEW_CHARS),
            other => panic!("unexpected {other:?}"),
        }
    }
}
