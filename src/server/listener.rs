//! HTTP listener running on its own task.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};

use crate::errors::{AppError, AppResult};

/// Handle to a listener serving a router in the background.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
    finished: bool,
}

impl ListenerHandle {
    /// Bind `addr` and start serving `app` on a spawned task.
    ///
    /// # Errors
    /// Returns an internal error if the address cannot be bound.
    pub async fn bind(addr: &str, app: Router) -> AppResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::internal(format!("Failed to read bound address: {}", e)))?;

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // A dropped sender also stops the listener
                    let _ = stopped.await;
                })
                .await
        });

        tracing::info!("Server running on http://{}", local_addr);

        Ok(Self {
            local_addr,
            stop: Some(stop),
            task,
            finished: false,
        })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Resolve when the listener task ends without being asked to.
    ///
    /// Cancel safe: dropping this future leaves the handle usable.
    pub async fn exited(&mut self) -> AppResult<()> {
        let result = (&mut self.task).await;
        self.finished = true;
        flatten(result)
    }

    /// Stop accepting connections and wait up to `grace` for in-flight
    /// requests. Whatever is still running after that is aborted.
    pub async fn shutdown(mut self, grace: Duration) -> AppResult<()> {
        if self.finished {
            return Ok(());
        }
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(result) => {
                tracing::info!("Listener stopped");
                flatten(result)
            }
            Err(_) => {
                tracing::warn!(grace = ?grace, "In-flight requests outlived the grace period, aborting");
                self.task.abort();
                Ok(())
            }
        }
    }
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> AppResult<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {}", e))),
        Err(e) => Err(AppError::internal(format!("Listener task failed: {}", e))),
    }
}
