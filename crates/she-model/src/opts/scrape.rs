use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::TimeoutMs;

/// Scheduling and failure-threshold settings shared by every task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeOpts {
    /// Consecutive failed refreshes tolerated before a task's exit code is reported.
    ///
    /// The gauge flips once the failure counter exceeds this value.
    pub max_failures: u32,
    /// Maximum cache age before a metrics read triggers a background refresh.
    pub staleness_ms: TimeoutMs,
    /// Delay between scheduled refreshes of one task; `0` disables the schedule.
    pub interval_ms: TimeoutMs,
}

impl Default for ScrapeOpts {
    fn default() -> Self {
        Self {
            max_failures: 4,
            staleness_ms: 60_000,
            interval_ms: 60_000,
        }
    }
}

impl ScrapeOpts {
    #[inline]
    pub fn staleness(&self) -> Duration {
        Duration::from_millis(self.staleness_ms)
    }

    #[inline]
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_ms > 0).then(|| Duration::from_millis(self.interval_ms))
    }
}
