//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to webhook:
//!     → timeouts.rs (enforce the upstream deadline)
//!     → On failure: error is classified and returned, never retried
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: form submissions are not idempotent and the visitor owns
//!   the decision to resubmit

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
