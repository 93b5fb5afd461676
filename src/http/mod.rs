//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits)
//!     → pipeline (per route group: rate limit → identity → role)
//!     → handlers.rs / records.rs
//!     → error.rs (ApiError → status + JSON body)
//!     → Send to client
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod records;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
