//! Background jobs
//!
//! Periodic jobs run on the tokio runtime next to the HTTP listener. Each
//! job gets its own task; a failing run is logged and the job keeps its
//! schedule.

mod heartbeat;
mod scheduler;

pub use heartbeat::StoreHeartbeat;
pub use scheduler::{JobScheduler, PeriodicJob};
