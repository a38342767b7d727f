//! Common model-level constants.
//!
//! Well-known label keys and exit-code sentinels shared by the scraper, the tasks and the exporter.

/// Exit code reported for a healthy task.
pub const EXIT_CODE_OK: i64 = 0;

/// Exit code reported when a failure carries no process status of its own
/// (timeout, spawn failure, unparseable output, termination by signal).
pub const EXIT_CODE_FAILED: i64 = 1;

/// Label key carrying the task name on the exit-code gauges.
pub const LABEL_TASK: &str = "task";

/// Label key carrying the storage node address on per-host samples.
pub const LABEL_STORAGE_IP: &str = "storage_ip";
