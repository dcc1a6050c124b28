//! Store session - owns the handle to the relational store.
//!
//! The handle is a sea-orm [`DatabaseConnection`] backed by an sqlx Postgres
//! pool, so every repository operation checks out its own pooled connection.
//! The session itself is created once by the server process and shared by
//! `Arc`; there is no process-global handle.

use std::future::Future;
use std::sync::Arc;

use sea_orm::sqlx::{
    self,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, SqlxPostgresConnector, Statement};
use tokio::sync::RwLock;

use super::schema::TableSchema;
use crate::config::DatabaseCredentials;
use crate::errors::{AppError, AppResult};

/// Observable lifecycle state of a [`StoreSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unopened,
    Open,
    Closed,
}

enum SessionState {
    Unopened,
    Open(Arc<DatabaseConnection>),
    Closed,
}

/// Lifecycle owner for the store handle.
pub struct StoreSession {
    credentials: Option<DatabaseCredentials>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for StoreSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSession")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Default for StoreSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreSession {
    /// An unopened session with no remembered credentials.
    pub fn new() -> Self {
        Self {
            credentials: None,
            state: RwLock::new(SessionState::Unopened),
        }
    }

    /// An unopened session that opens itself on first use.
    pub fn with_credentials(credentials: DatabaseCredentials) -> Self {
        Self {
            credentials: Some(credentials),
            state: RwLock::new(SessionState::Unopened),
        }
    }

    /// Wrap an already established connection.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            credentials: None,
            state: RwLock::new(SessionState::Open(Arc::new(connection))),
        }
    }

    /// Establish a fresh handle and verify it with a round trip.
    ///
    /// Any previously held handle is replaced and released.
    ///
    /// # Errors
    /// [`AppError::Authentication`] when the store rejects the credentials,
    /// [`AppError::Connection`] for every other failure to connect.
    pub async fn open(
        &self,
        credentials: &DatabaseCredentials,
    ) -> AppResult<Arc<DatabaseConnection>> {
        let connection = Arc::new(connect(credentials).await?);

        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut *state, SessionState::Open(connection.clone()))
        };
        if let SessionState::Open(previous) = previous {
            if let Err(e) = previous.close_by_ref().await {
                tracing::warn!(error = %e, "Failed to release replaced store handle");
            }
        }

        Ok(connection)
    }

    /// Release the handle if one is open. Closing twice is a no-op.
    ///
    /// # Errors
    /// [`AppError::Close`] only when releasing the handle itself fails.
    pub async fn close(&self) -> AppResult<()> {
        let previous = {
            let mut state = self.state.write().await;
            if !matches!(*state, SessionState::Open(_)) {
                return Ok(());
            }
            std::mem::replace(&mut *state, SessionState::Closed)
        };

        if let SessionState::Open(connection) = previous {
            connection
                .close_by_ref()
                .await
                .map_err(|e| AppError::Close(e.to_string()))?;
            tracing::info!("Store session closed");
        }
        Ok(())
    }

    /// Get the open handle, opening on demand when credentials are remembered.
    ///
    /// # Errors
    /// [`AppError::Connection`] when the session is closed, or unopened with
    /// nothing to open it with.
    pub async fn connection(&self) -> AppResult<Arc<DatabaseConnection>> {
        match &self.credentials {
            Some(credentials) => self.get_or_open(|| connect(credentials)).await,
            None => {
                self.get_or_open(|| async {
                    Err(AppError::Connection(
                        "store session has not been opened".to_string(),
                    ))
                })
                .await
            }
        }
    }

    /// Return the open handle, or run `connect` once under the write lock.
    ///
    /// Concurrent first callers wait on the lock and reuse the handle the
    /// winner installed.
    async fn get_or_open<F, Fut>(&self, connect: F) -> AppResult<Arc<DatabaseConnection>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<DatabaseConnection>>,
    {
        let existing = current(&*self.state.read().await)?;
        if let Some(connection) = existing {
            return Ok(connection);
        }

        let mut state = self.state.write().await;
        if let Some(connection) = current(&state)? {
            return Ok(connection);
        }

        let connection = Arc::new(connect().await?);
        *state = SessionState::Open(connection.clone());
        Ok(connection)
    }

    /// Round-trip liveness probe.
    pub async fn ping(&self) -> AppResult<()> {
        let connection = self.connection().await?;
        probe(&connection).await.map_err(AppError::from)
    }

    pub async fn status(&self) -> SessionStatus {
        match *self.state.read().await {
            SessionState::Unopened => SessionStatus::Unopened,
            SessionState::Open(_) => SessionStatus::Open,
            SessionState::Closed => SessionStatus::Closed,
        }
    }

    /// Create the table if it does not exist yet.
    ///
    /// # Errors
    /// [`AppError::Schema`] for a malformed schema or a rejected statement.
    pub async fn ensure_table(&self, schema: &TableSchema) -> AppResult<()> {
        schema.validate()?;
        let connection = self.connection().await?;

        let backend = connection.get_database_backend();
        connection
            .execute(backend.build(&schema.create_statement()))
            .await
            .map_err(|e| AppError::schema(format!("creating table {}: {}", schema.name, e)))?;

        tracing::info!(table = %schema.name, "Table provisioned");
        Ok(())
    }
}

/// `Some` when open, `None` when still unopened.
fn current(state: &SessionState) -> AppResult<Option<Arc<DatabaseConnection>>> {
    match state {
        SessionState::Open(connection) => Ok(Some(connection.clone())),
        SessionState::Closed => Err(AppError::Connection(
            "store session is closed".to_string(),
        )),
        SessionState::Unopened => Ok(None),
    }
}

async fn connect(credentials: &DatabaseCredentials) -> AppResult<DatabaseConnection> {
    let options = PgConnectOptions::new()
        .host(&credentials.host)
        .port(credentials.port)
        .username(&credentials.user)
        .password(credentials.password())
        .database(&credentials.database);

    let pool = PgPoolOptions::new()
        .max_connections(credentials.max_connections)
        .acquire_timeout(credentials.connect_timeout)
        .connect_with(options)
        .await
        .map_err(classify_connect_error)?;

    let connection = SqlxPostgresConnector::from_sqlx_postgres_pool(pool);
    probe(&connection)
        .await
        .map_err(|e| AppError::Connection(e.to_string()))?;

    tracing::info!(
        host = %credentials.host,
        port = credentials.port,
        database = %credentials.database,
        "Store session opened"
    );
    Ok(connection)
}

async fn probe(connection: &DatabaseConnection) -> Result<(), DbErr> {
    connection
        .execute(Statement::from_string(
            connection.get_database_backend(),
            "SELECT 1",
        ))
        .await?;
    Ok(())
}

/// SQLSTATE class 28 is "invalid authorization specification".
fn classify_connect_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().is_some_and(|code| code.starts_with("28")) {
            return AppError::Authentication;
        }
    }
    AppError::Connection(err.to_string())
}
