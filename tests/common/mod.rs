//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use form_relay::config::RelayConfig;
use form_relay::http::RelayServer;
use form_relay::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A mock webhook and what it has received.
#[allow(dead_code)]
pub struct MockWebhook {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    bodies: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockWebhook {
    pub fn url(&self) -> String {
        format!("http://{}/macros/s/test/exec", self.addr)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Request bodies received so far, parsed as JSON.
    pub fn bodies(&self) -> Vec<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .map(|b| serde_json::from_str(b).unwrap())
            .collect()
    }
}

/// Start a mock webhook that always answers 200 with `body`.
#[allow(dead_code)]
pub async fn start_mock_webhook(body: &'static str) -> MockWebhook {
    start_programmable_webhook(move || async move { (200, body.to_string()) }).await
}

/// Start a programmable mock webhook with async support.
pub async fn start_programmable_webhook<F, Fut>(f: F) -> MockWebhook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (task_calls, task_bodies) = (calls.clone(), bodies.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let calls = task_calls.clone();
                    let bodies = task_bodies.clone();
                    tokio::spawn(async move {
                        let body = read_request_body(&mut socket).await;
                        calls.fetch_add(1, Ordering::SeqCst);
                        bodies.lock().unwrap().push(body);

                        let (status, response) = f().await;
                        let response_str = format!(
                            "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockWebhook { addr, calls, bodies }
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request_body(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = buf.len().min(header_end + content_length);
    String::from_utf8_lossy(&buf[header_end..end]).to_string()
}

/// A relay running on an ephemeral port.
#[allow(dead_code)]
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<RelayConfig>,
}

#[allow(dead_code)]
impl RunningRelay {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn submit_url(&self) -> String {
        format!("http://{}/submit", self.addr)
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay with `config` on 127.0.0.1 and an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = RelayServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    RunningRelay { addr, shutdown, config_tx }
}

/// Default config pointing at `webhook_url`.
#[allow(dead_code)]
pub fn config_for(webhook_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.upstream.webhook_url = Some(webhook_url.to_string());
    config.upstream.webhook_url_env = "FORM_RELAY_TEST_UNSET_WEBHOOK".to_string();
    config
}

/// A submission that passes validation.
#[allow(dead_code)]
pub fn valid_submission() -> Value {
    json!({
        "name": "Ana",
        "email": "a@b.com",
        "phone": "0555123456",
        "type": "landing",
        "budget": "500",
        "deadline": "2025-01-01",
        "message": "hello"
    })
}

#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
