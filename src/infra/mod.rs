//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - The store session and its lifecycle
//! - Declarative table provisioning
//! - Repositories over the store

pub mod db;
pub mod repositories;

pub use db::{ColumnKind, ColumnSpec, SessionStatus, StoreSession, TableSchema};
pub use repositories::{users_schema, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
