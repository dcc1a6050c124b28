//! Interval scheduler for [`PeriodicJob`]s.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::errors::AppResult;

/// A unit of work repeated on a fixed interval.
#[async_trait]
pub trait PeriodicJob: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Time between runs. The first run happens one interval after start.
    fn interval(&self) -> Duration;

    async fn run(&self) -> AppResult<()>;
}

/// Running set of periodic jobs.
pub struct JobScheduler {
    stop: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl JobScheduler {
    /// Spawn one task per job. Jobs with a zero interval are not started.
    pub fn start(jobs: Vec<Arc<dyn PeriodicJob>>) -> Self {
        let (stop, _) = watch::channel(false);
        let mut tasks = JoinSet::new();

        for job in jobs {
            if job.interval().is_zero() {
                tracing::error!(job = job.name(), "Periodic job has a zero interval, not starting");
                continue;
            }
            let stop_rx = stop.subscribe();
            tracing::info!(job = job.name(), interval = ?job.interval(), "Starting periodic job");
            tasks.spawn(run_job(job, stop_rx));
        }

        Self { stop, tasks }
    }

    /// Number of jobs still running.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signal every job to stop and wait for them.
    ///
    /// A run already in progress finishes first.
    pub async fn shutdown(mut self) {
        // Errs only when every job has already exited
        let _ = self.stop.send(true);

        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Periodic job task ended abnormally");
            }
        }
        tracing::info!("Background jobs stopped");
    }
}

async fn run_job(job: Arc<dyn PeriodicJob>, mut stop: watch::Receiver<bool>) {
    let period = job.interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match job.run().await {
                    Ok(()) => tracing::debug!(job = job.name(), "Periodic job completed"),
                    Err(e) => tracing::warn!(job = job.name(), error = %e, "Periodic job failed"),
                }
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
}
