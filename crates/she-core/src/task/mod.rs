mod report;
pub use report::Report;

use std::sync::Arc;

use async_trait::async_trait;
use she_model::MetricDesc;

use crate::error::TaskError;

/// One external health check together with the parser of its output.
///
/// A task is stateless across collections: caching, failure counting and exit-code
/// reporting live in the scraper. Implementations must not share mutable state with
/// other tasks; every collection spawns its own processes.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Unique identifier; also the `task` label value of the exit-code gauge.
    fn name(&self) -> &str;

    /// Every metric family the task may emit, known before the first collection.
    fn describe(&self) -> &'static [&'static MetricDesc];

    /// Run the external command(s) and turn the output into samples.
    ///
    /// `Ok` with a non-zero [`Report::exit_code`] means the tool failed partially:
    /// the samples are usable but the run still counts as a failure.
    async fn collect(&self) -> Result<Report, TaskError>;
}

/// Shared, type-erased task.
pub type TaskRef = Arc<dyn Task>;
