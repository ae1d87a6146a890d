use reqwest::Client;
use serde::{Deserialize, Serialize};

/// A contact/order form as the website collects it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Kind of site requested ("landing", "vitrine", "e-commerce", ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub budget: String,
    pub deadline: String,
    pub message: String,
}

/// What the relay answered: its HTTP status and JSON body.
#[derive(Debug, Clone)]
pub struct RelayReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl RelayReply {
    /// True when the relay accepted and forwarded the submission.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The user-facing error message, if the relay rejected the submission.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(|e| e.as_str())
    }
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
    submit_path: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.trim_end_matches('/').to_string(),
            submit_path: "/submit".to_string(),
        }
    }

    /// Use a non-default submission path (e.g. "/api/submit").
    pub fn with_submit_path(mut self, path: &str) -> Self {
        self.submit_path = path.to_string();
        self
    }

    /// Post a submission to the relay.
    ///
    /// Non-2xx answers are not errors here: the relay always answers with a JSON
    /// body describing the outcome, which is returned as-is.
    pub async fn submit(&self, submission: &Submission) -> Result<RelayReply, Box<dyn std::error::Error + Send + Sync>> {
        self.submit_raw(&serde_json::to_value(submission)?, None).await
    }

    /// Post an arbitrary JSON body, optionally tagging the client address with
    /// `X-Forwarded-For` the way a fronting proxy would.
    pub async fn submit_raw(
        &self,
        body: &serde_json::Value,
        forwarded_for: Option<&str>,
    ) -> Result<RelayReply, Box<dyn std::error::Error + Send + Sync>> {
        let mut req = self.client
            .post(format!("{}{}", self.relay_url, self.submit_path))
            .json(body);
        if let Some(addr) = forwarded_for {
            req = req.header("X-Forwarded-For", addr);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        let body = serde_json::from_str(&text)
            .map_err(|e| format!("Relay returned non-JSON body (status {}): {}", status, e))?;
        Ok(RelayReply { status, body })
    }

    /// Query the relay's health endpoint.
    pub async fn health(&self) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        let resp = self.client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Relay returned error status {}: {}", status, text).into());
        }
        Ok(serde_json::from_str(&text)?)
    }
}
