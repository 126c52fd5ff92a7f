//! API Server - HTTP interface to emotion graph analysis.
//!
//! This crate provides:
//! - REST endpoints for single, batch and classify-only analysis
//! - Per-analysis sequence numbers so clients can drop stale results
//! - CORS and request tracing middleware

pub mod routes;
pub mod handlers;

pub use handlers::{AppState, SharedState};
pub use routes::{create_router, create_router_with_middleware};
