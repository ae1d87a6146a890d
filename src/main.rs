//! Form relay service.
//!
//! Receives the website's contact/order form and relays it to the
//! spreadsheet-backed Apps Script webhook.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                      FORM RELAY                      │
//!                     │                                                      │
//!   Browser form      │  ┌──────────┐   ┌────────────┐   ┌────────────────┐  │
//!   ──────────────────┼─▶│   CORS   │──▶│ rate limit │──▶│   validate +   │  │
//!                     │  │ preflight│   │ per client │   │    sanitize    │  │
//!                     │  └──────────┘   └────────────┘   └───────┬────────┘  │
//!                     │                                          │           │
//!                     │                                          ▼           │
//!   JSON result       │  ┌──────────────────┐           ┌────────────────┐   │
//!   ◀─────────────────┼──│ response shaping │◀──────────│   forwarder    │◀──┼── Apps Script
//!                     │  │ + CORS/security  │           │ (25s deadline) │   │   webhook
//!                     │  └──────────────────┘           └────────────────┘   │
//!                     │                                                      │
//!                     │  config (TOML + hot reload) · logging · lifecycle    │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "form-relay")]
#[command(about = "Relays the website's contact form to the Apps Script webhook", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    form_relay::lifecycle::startup::run(args.config.as_deref()).await?;
    Ok(())
}
