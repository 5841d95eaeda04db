//! HTTP surface of the service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, timeout and trace layers)
//!     → handlers.rs
//!         /sort    → RequestLifecycle on the blocking pool
//!         /health  → static liveness body
//!         /metrics → Prometheus exposition
//!     → response.rs (status code + JSON body)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
