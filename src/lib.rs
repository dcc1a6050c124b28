//! Todo API - user and todo service backed by PostgreSQL.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities
//! - **services**: Application use cases
//! - **infra**: Store session, table provisioning, repositories
//! - **api**: HTTP handlers, middleware, and routes
//! - **jobs**: Periodic background jobs
//! - **server**: Listener, signal wait and shutdown sequencing
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve --port 4000
//!
//! # Create the tables and exit
//! cargo run -- provision
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod server;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{NewUser, Password, User};
pub use errors::{AppError, AppResult};
pub use infra::StoreSession;
pub use server::ServerProcess;
