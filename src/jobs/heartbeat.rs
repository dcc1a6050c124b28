//! Store heartbeat job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::PeriodicJob;
use crate::config::JOB_NAME_STORE_HEARTBEAT;
use crate::errors::AppResult;
use crate::infra::StoreSession;

/// Pings the store session so a dead connection shows up in the logs
/// before a request hits it.
pub struct StoreHeartbeat {
    session: Arc<StoreSession>,
    interval: Duration,
}

impl StoreHeartbeat {
    pub fn new(session: Arc<StoreSession>, interval: Duration) -> Self {
        Self { session, interval }
    }
}

#[async_trait]
impl PeriodicJob for StoreHeartbeat {
    fn name(&self) -> &str {
        JOB_NAME_STORE_HEARTBEAT
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> AppResult<()> {
        self.session.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_heartbeat_pings_open_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let job = StoreHeartbeat::new(
            Arc::new(StoreSession::from_connection(db)),
            Duration::from_secs(1),
        );

        assert_eq!(job.name(), JOB_NAME_STORE_HEARTBEAT);
        assert!(job.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_heartbeat_fails_on_closed_session() {
        let session = Arc::new(StoreSession::from_connection(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        session.close().await.unwrap();
        let job = StoreHeartbeat::new(session, Duration::from_secs(1));

        assert!(matches!(job.run().await, Err(AppError::Connection(_))));
    }
}
