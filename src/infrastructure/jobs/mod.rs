//! Background Jobs
//!
//! Periodic maintenance loops spawned at startup. Each job runs on its
//! own tokio interval; a failed tick is logged and retried on the next
//! interval rather than aborting the loop.
//!
//! # Jobs
//! - **session purge**: deletes expired and revoked refresh-token sessions
//! - **swipe purge**: deletes old `pass` swipes so those profiles
//!   re-enter the swiper's discovery feed

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::config::JobSettings;
use crate::domain::{SessionRepository, SwipeRepository};
use crate::infrastructure::metrics;

/// Spawns the background job loops and keeps their handles.
pub struct JobRunner {
    handles: Vec<JoinHandle<()>>,
}

impl JobRunner {
    /// Spawn all maintenance loops.
    pub fn start<Se, Sw>(
        settings: &JobSettings,
        session_repo: Arc<Se>,
        swipe_repo: Arc<Sw>,
    ) -> Self
    where
        Se: SessionRepository + 'static,
        Sw: SwipeRepository + 'static,
    {
        let mut handles = Vec::new();

        handles.push(spawn_session_purge(
            session_repo,
            Duration::from_secs(settings.session_purge_interval_secs),
        ));
        handles.push(spawn_swipe_purge(
            swipe_repo,
            Duration::from_secs(settings.swipe_purge_interval_secs),
            settings.pass_resurface_days,
        ));

        Self { handles }
    }

    /// Abort all job loops (used on shutdown).
    pub fn shutdown(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn spawn_session_purge<Se>(session_repo: Arc<Se>, interval: Duration) -> JoinHandle<()>
where
    Se: SessionRepository + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so startup stays quick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match session_repo.delete_expired().await {
                Ok(removed) => {
                    metrics::record_job_run("session_purge", true);
                    if removed > 0 {
                        tracing::info!(removed, "Purged expired sessions");
                    }
                }
                Err(e) => {
                    metrics::record_job_run("session_purge", false);
                    tracing::error!(error = %e, "Session purge failed");
                }
            }
        }
    })
}

fn spawn_swipe_purge<Sw>(
    swipe_repo: Arc<Sw>,
    interval: Duration,
    resurface_days: i64,
) -> JoinHandle<()>
where
    Sw: SwipeRepository + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(resurface_days);
            match swipe_repo.delete_passes_before(cutoff).await {
                Ok(removed) => {
                    metrics::record_job_run("swipe_purge", true);
                    if removed > 0 {
                        tracing::info!(removed, "Purged old pass swipes for re-surfacing");
                    }
                }
                Err(e) => {
                    metrics::record_job_run("swipe_purge", false);
                    tracing::error!(error = %e, "Swipe purge failed");
                }
            }
        }
    })
}
