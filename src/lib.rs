//! Request admission gateway library.
//!
//! Authenticates bearer tokens, throttles callers and authorizes by role in
//! front of a small record API.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod security;
pub mod store;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
