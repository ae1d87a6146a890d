//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (request_id, kind, status)
//!     → logging.rs (subscriber: env filter + fmt to stdout)
//! Per request:
//!     → tower-http TraceLayer span
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted strings
//! - Request ID flows through every log line of a submission
//! - No metrics or trace export

pub mod logging;
