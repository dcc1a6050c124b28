//! Store session and table provisioning.

mod schema;
mod session;

pub use schema::{ColumnKind, ColumnSpec, TableSchema};
pub use session::{SessionStatus, StoreSession};
