//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 4000;

/// Default per-request deadline, in seconds. Requests still running when it
/// elapses get a 408. Idle keep-alive connections are not timed out separately.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 5;

/// Default time allowed for in-flight requests after a shutdown signal
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

// =============================================================================
// Cross-Origin Policy
// =============================================================================

/// Default origin allowed to call the API with credentials
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Request headers accepted from the allowed origin
pub const CORS_ALLOWED_HEADERS: &[&str] = &["origin", "content-type", "accept", "authorization"];

// =============================================================================
// Database
// =============================================================================

/// Default database host
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default database port
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default upper bound on pooled store connections
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Default timeout for establishing a store connection, in seconds
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Name of the table holding registered users
pub const USERS_TABLE: &str = "users";

// =============================================================================
// Background Jobs
// =============================================================================

/// Default interval between store heartbeat probes, in seconds
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 300;

/// Store heartbeat job identifier
pub const JOB_NAME_STORE_HEARTBEAT: &str = "store::heartbeat";

// =============================================================================
// HTTP Surface
// =============================================================================

/// Fixed liveness payload returned by the health check
pub const HEALTHCHECK_BODY: &str = "Access Granted";
