//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, client address)
//!     → [security: CORS, rate limit]
//!     → server.rs submit handler (validate → sanitize → forward)
//!     → response.rs (status + JSON body for every outcome)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{client_address, X_REQUEST_ID};
pub use response::{ErrorKind, RelayError};
pub use server::{AppState, RelayServer};
