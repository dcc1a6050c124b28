//! Server process - startup order, serving, and orderly shutdown.

use std::future::Future;
use std::sync::Arc;

use axum::Router;

use super::listener::ListenerHandle;
use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{StoreSession, UserRepository, UserStore};
use crate::jobs::{JobScheduler, PeriodicJob, StoreHeartbeat};

/// Owns the store session, the listener and the background jobs for the
/// lifetime of the process.
///
/// Startup runs in a fixed order: open the store and provision tables,
/// build the router, start jobs, bind the listener. Any startup failure is
/// returned before traffic is served.
pub struct ServerProcess {
    config: Config,
    session: Arc<StoreSession>,
    routes: Router<AppState>,
    jobs: Vec<Arc<dyn PeriodicJob>>,
}

impl ServerProcess {
    pub fn new(config: Config) -> Self {
        let session = Arc::new(StoreSession::with_credentials(config.database.clone()));
        let heartbeat: Arc<dyn PeriodicJob> =
            Arc::new(StoreHeartbeat::new(session.clone(), config.heartbeat_interval));

        Self {
            config,
            session,
            routes: Router::new(),
            jobs: vec![heartbeat],
        }
    }

    /// Merge an additional route family under `/api`.
    pub fn with_routes(mut self, routes: Router<AppState>) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// Register an additional periodic job.
    pub fn with_job(mut self, job: Arc<dyn PeriodicJob>) -> Self {
        self.jobs.push(job);
        self
    }

    /// The session handlers and jobs share.
    pub fn session(&self) -> Arc<StoreSession> {
        self.session.clone()
    }

    /// Start everything, serve until `shutdown` resolves, then tear down.
    ///
    /// # Errors
    /// Returns the first startup failure (store, provisioning, router or
    /// bind), or a listener that stopped on its own.
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            config,
            session,
            routes,
            jobs,
        } = self;

        tracing::info!("Starting server...");

        let (mut listener, scheduler) = match start(&config, &session, routes, jobs).await {
            Ok(started) => started,
            Err(e) => {
                close_session(&session).await;
                return Err(e);
            }
        };

        let outcome = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown requested");
                Ok(())
            }
            exited = listener.exited() => {
                tracing::error!("Listener exited unexpectedly");
                exited.and(Err(AppError::internal("listener exited unexpectedly")))
            }
        };

        let stopped = listener.shutdown(config.shutdown_grace).await;
        scheduler.shutdown().await;
        close_session(&session).await;

        tracing::info!("Server shutdown complete");
        outcome.and(stopped)
    }
}

async fn start(
    config: &Config,
    session: &Arc<StoreSession>,
    routes: Router<AppState>,
    jobs: Vec<Arc<dyn PeriodicJob>>,
) -> AppResult<(ListenerHandle, JobScheduler)> {
    session.open(&config.database).await?;
    UserStore::new(session.clone()).ensure_table().await?;
    tracing::info!("Store ready");

    let state = AppState::from_session(session.clone());
    let app = create_router(state, routes, config)?;

    let scheduler = JobScheduler::start(jobs);

    match ListenerHandle::bind(&config.server_addr(), app).await {
        Ok(listener) => Ok((listener, scheduler)),
        Err(e) => {
            scheduler.shutdown().await;
            Err(e)
        }
    }
}

async fn close_session(session: &StoreSession) {
    if let Err(e) = session.close().await {
        tracing::error!(error = %e, "Failed to close store session");
    }
}
