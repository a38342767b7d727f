mod flag;
pub use flag::Flag;

mod constants;
pub use constants::{EXIT_CODE_FAILED, EXIT_CODE_OK, LABEL_STORAGE_IP, LABEL_TASK};

/// Timeout value in milliseconds.
///
/// Used in option structs where an explicit time limit is configured.
pub type TimeoutMs = u64;

/// Exit status as reported on the exit-code gauge.
pub type ExitCode = i64;
