//! Upstream webhook subsystem.
//!
//! # Data Flow
//! ```text
//! SanitizedPayload
//!     → forwarder.rs (POST JSON, bounded by the deadline)
//!     → body read as text
//!     → interpret_body (JSON | HTML error page | garbage)
//!     → Value passed back verbatim, or an UpstreamError
//! ```
//!
//! # Design Decisions
//! - Single attempt, no retry
//! - Deadline expiry is its own error kind (504)
//! - HTML sniffing is a deliberate special case for Apps Script deployments

pub mod forwarder;

pub use forwarder::{interpret_body, UpstreamError, WebhookForwarder};
