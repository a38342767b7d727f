use std::{
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, instrument, warn};

use crate::{exit_code::ExitCodeHandle, scraper::result::TaskResult, task::TaskRef};

/// Registry entry for one task: the task, its exit-code sink, the cached result and the
/// per-task refresh lock.
pub(crate) struct TaskSlot {
    task: TaskRef,
    exit_code: ExitCodeHandle,
    current: RwLock<Option<Arc<TaskResult>>>,
    refresh: Arc<Mutex<()>>,
}

impl TaskSlot {
    pub(crate) fn new(task: TaskRef, exit_code: ExitCodeHandle) -> Self {
        Self {
            task,
            exit_code,
            current: RwLock::new(None),
            refresh: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn task(&self) -> &TaskRef {
        &self.task
    }

    pub(crate) fn name(&self) -> &str {
        self.task.name()
    }

    /// Current cache entry; never waits for a running refresh.
    pub(crate) fn snapshot(&self) -> Option<Arc<TaskResult>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn is_stale(&self, staleness: Duration) -> bool {
        self.snapshot().is_none_or(|r| r.is_stale(staleness))
    }

    /// Claim the refresh lock if nobody holds it.
    pub(crate) fn try_claim(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.refresh).try_lock_owned().ok()
    }

    /// Refresh, waiting for an in-flight refresh of the same task to finish first.
    pub(crate) async fn refresh(&self, max_failures: u32) -> Arc<TaskResult> {
        let _guard = self.refresh.lock().await;
        self.refresh_locked(max_failures).await
    }

    /// Run one collection and publish it. Caller must hold the refresh lock.
    #[instrument(level = "debug", skip(self), fields(task = %self.task.name()))]
    pub(crate) async fn refresh_locked(&self, max_failures: u32) -> Arc<TaskResult> {
        let started = Instant::now();
        let outcome = self.task.collect().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Ok(report) = &outcome {
            debug!(
                elapsed_ms,
                samples = report.samples().len(),
                exit_code = report.exit_code(),
                "collection finished"
            );
            if report.skipped() > 0 {
                warn!(skipped = report.skipped(), "malformed records skipped");
            }
        }

        let prev = self.snapshot();
        let next = Arc::new(TaskResult::next(prev.as_deref(), outcome, max_failures));

        let failures = next.consecutive_failures();
        if let Some(reason) = next.last_error() {
            if failures > max_failures {
                error!(
                    failures,
                    max_failures,
                    exit_code = next.exit_code(),
                    last_success = ?next.last_success(),
                    "refresh failed, threshold exceeded: {reason}"
                );
            } else {
                warn!(failures, max_failures, "refresh failed, within tolerance: {reason}");
            }
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&next));
        self.exit_code
            .set_exit_code(self.task.name(), next.reported_exit_code());
        next
    }
}
