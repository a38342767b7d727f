mod backend;
pub use backend::{ExitCodeHandle, ExitCodeSink};

mod noop;
pub use noop::{NoOpExitCode, noop_exit_code};
