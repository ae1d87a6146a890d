//! Client for the form relay, used by the CLI and the integration tests.

mod client;

pub use client::{RelayClient, RelayReply, Submission};
