use std::sync::Arc;

use she_model::ExitCode;

/// Destination for the per-task exit code the exporter reports.
///
/// The scraper calls [`ExitCodeSink::set_exit_code`] after every refresh with the
/// *reported* code: zero while the task is within its failure tolerance, the code of the
/// latest failure once the tolerance is exceeded.
///
/// # Arguments
/// - `task`: task name, used as the `task` label value
/// - `code`: exit code to expose
pub trait ExitCodeSink: Send + Sync + 'static {
    fn set_exit_code(&self, task: &str, code: ExitCode);
}

/// Shared handle to an exit-code sink; one per task family.
pub type ExitCodeHandle = Arc<dyn ExitCodeSink>;
