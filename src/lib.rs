//! Contact/order form relay for the agency website.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod submission;
pub mod upstream;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
