//! API layer - HTTP handlers and middleware
//!
//! This module contains all HTTP-related concerns:
//! - Request handlers
//! - Middleware (cross-origin, compression, timeout)
//! - Custom extractors
//! - Route definitions

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::{api_routes, create_router};
pub use state::AppState;
