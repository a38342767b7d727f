use she_exec::ExecError;
use she_model::{EXIT_CODE_FAILED, ExitCode};
use thiserror::Error;

/// Registry-level errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),
}

/// Why a single collection produced no usable samples.
///
/// Every variant counts as one failure for threshold purposes.
/// None of them is fatal: the scraper records it and keeps serving the previous samples.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The external process did not finish within its bound.
    #[error("execution timeout: {0}")]
    Timeout(String),

    /// The process could not be started, or exited non-zero without usable output.
    #[error("execution error: {reason}")]
    Execution { reason: String, exit_code: ExitCode },

    /// Output was captured but could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl TaskError {
    /// Exit code to report once the failure threshold is exceeded.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            TaskError::Execution { exit_code, .. } => *exit_code,
            TaskError::Timeout(_) | TaskError::Parse(_) => EXIT_CODE_FAILED,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Timeout(_) => "timeout",
            TaskError::Execution { .. } => "execution",
            TaskError::Parse(_) => "parse",
        }
    }
}

impl From<ExecError> for TaskError {
    fn from(e: ExecError) -> Self {
        if e.is_timeout() {
            return TaskError::Timeout(e.to_string());
        }
        TaskError::Execution {
            exit_code: e.exit_code(),
            reason: e.to_string(),
        }
    }
}
