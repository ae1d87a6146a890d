//! Form submission handling.
//!
//! # Data Flow
//! ```text
//! raw JSON body (untrusted)
//!     → validate.rs (all-or-nothing field checks)
//!     → sanitize.rs (trim, strip markup brackets, cap, lower-case email)
//!     → SanitizedPayload (the only thing forwarded upstream)
//! ```

pub mod sanitize;
pub mod validate;

pub use sanitize::{sanitize, SanitizedPayload};
pub use validate::{validate, ValidationError};
