mod result;
pub use result::TaskResult;

mod slot;
use slot::TaskSlot;

use std::sync::Arc;

use tokio::{task::JoinSet, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::CoreError,
    exit_code::ExitCodeHandle,
    policy::ScrapePolicy,
    task::TaskRef,
};

/// Task registry and result cache.
///
/// Reads ([`Scraper::snapshot`], [`Scraper::snapshots`]) never wait for a refresh.
/// At most one refresh per task runs at a time; different tasks refresh independently.
pub struct Scraper {
    slots: Vec<Arc<TaskSlot>>,
    policy: ScrapePolicy,
}

impl Scraper {
    pub fn new(policy: ScrapePolicy) -> Self {
        Self {
            slots: Vec::new(),
            policy,
        }
    }

    /// Register a task together with the sink receiving its exit code.
    pub fn add_task(&mut self, task: TaskRef, exit_code: ExitCodeHandle) -> Result<(), CoreError> {
        if self.slot(task.name()).is_some() {
            return Err(CoreError::DuplicateTask(task.name().to_string()));
        }
        debug!(task = task.name(), "task registered");
        self.slots.push(Arc::new(TaskSlot::new(task, exit_code)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskRef> {
        self.slots.iter().map(|s| s.task())
    }

    /// Latest cached result of `name`, if it has been refreshed at least once.
    pub fn snapshot(&self, name: &str) -> Option<Arc<TaskResult>> {
        self.slot(name).and_then(|s| s.snapshot())
    }

    /// Latest cached result of every task that has one.
    pub fn snapshots(&self) -> Vec<(&str, Arc<TaskResult>)> {
        self.slots
            .iter()
            .filter_map(|s| s.snapshot().map(|r| (s.name(), r)))
            .collect()
    }

    /// Refresh one task now, waiting behind an in-flight refresh of the same task.
    pub async fn refresh(&self, name: &str) -> Result<Arc<TaskResult>, CoreError> {
        let slot = self
            .slot(name)
            .ok_or_else(|| CoreError::UnknownTask(name.to_string()))?;
        Ok(slot.refresh(self.policy.max_failures).await)
    }

    /// Refresh every task concurrently and wait for all of them.
    pub async fn update_all_metrics(&self) {
        let mut set = JoinSet::new();
        for slot in &self.slots {
            let slot = Arc::clone(slot);
            let max_failures = self.policy.max_failures;
            set.spawn(async move {
                slot.refresh(max_failures).await;
            });
        }
        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "refresh aborted");
            }
        }
    }

    /// Start a background refresh for every stale task that is not already refreshing.
    ///
    /// Returns the number of refreshes started. Does nothing outside a tokio runtime.
    pub fn trigger_stale(&self) -> usize {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return 0;
        };

        let mut started = 0;
        for slot in &self.slots {
            if !slot.is_stale(self.policy.staleness) {
                continue;
            }
            let Some(guard) = slot.try_claim() else {
                continue;
            };
            let slot = Arc::clone(slot);
            let max_failures = self.policy.max_failures;
            handle.spawn(async move {
                slot.refresh_locked(max_failures).await;
                drop(guard);
            });
            started += 1;
        }
        if started > 0 {
            debug!(started, "stale refreshes triggered");
        }
        started
    }

    /// Refresh each task on the policy interval until `cancel` fires.
    ///
    /// Every task gets its own loop, so a slow task never delays the others.
    /// A refresh already running when `cancel` fires is allowed to finish.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let Some(interval) = self.policy.interval else {
            info!("scheduled refresh disabled");
            cancel.cancelled().await;
            return;
        };
        info!(
            interval_ms = interval.as_millis() as u64,
            tasks = self.len(),
            "scheduled refresh started"
        );

        let mut loops = JoinSet::new();
        for slot in &self.slots {
            let slot = Arc::clone(slot);
            let cancel = cancel.clone();
            let max_failures = self.policy.max_failures;
            loops.spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            slot.refresh(max_failures).await;
                        }
                    }
                }
            });
        }
        while loops.join_next().await.is_some() {}
        info!("scheduled refresh stopped");
    }

    fn slot(&self, name: &str) -> Option<&Arc<TaskSlot>> {
        self.slots.iter().find(|s| s.name() == name)
    }
}
