//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (note allow-listed origin; answer preflight)
//!     → rate_limit.rs (per-client sliding window, POST only)
//!     → Pass to the submit handler
//! Outgoing response:
//!     → headers.rs (nosniff, frame denial)
//!     → cors.rs (echo allowed origin)
//! ```
//!
//! # Design Decisions
//! - Response headers are added by middleware so no exit path can miss them
//! - The limiter is an injected instance, not a global

pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use rate_limit::{RateLimitPolicy, RateLimiter};
