//! Bounded fire-and-forget task spawning.
//!
//! Background work (video enrichment) is spawned here rather than with a
//! bare `tokio::spawn`, so that the number of concurrent jobs is capped and
//! short-lived processes can wait for outstanding work before exiting.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info_span, warn, Instrument};

/// Spawns detached tasks, at most `max_concurrent` running at once.
#[derive(Clone)]
pub struct BackgroundTasks {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}

/// Handle to a spawned task. Dropping it does not cancel the task.
pub struct DetachedTask {
    name: String,
    handle: JoinHandle<()>,
}

impl DetachedTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the task. Returns `false` if it panicked.
    pub async fn wait(self) -> bool {
        self.handle.await.is_ok()
    }
}

impl BackgroundTasks {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn `task` in the background. It queues until a slot is free.
    pub fn spawn<F>(&self, name: impl Into<String>, task: F) -> DetachedTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let permits = self.permits.clone();
        let span = info_span!("background", task = %name);

        let handle = self.tracker.spawn(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    warn!("Background task dropped: spawner closed");
                    return;
                };
                debug!("Started");
                task.await;
                debug!("Finished");
            }
            .instrument(span),
        );

        DetachedTask { name, handle }
    }

    /// Tasks spawned and not yet finished, including queued ones.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait up to `timeout` for every spawned task to finish.
    /// Returns `true` if all finished in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let finished = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();
        finished
    }
}
