//! HTTP API layer for polleneer.
//!
//! This crate binds the engagement core to REST endpoints:
//!
//! - **Endpoints**: posts, users, notifications, and the viewer's ledger
//! - **Extractors**: authentication via bearer token
//! - **Middleware**: token lookup, request tracing
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
