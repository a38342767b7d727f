use std::sync::Arc;

use she_model::ExitCode;

use crate::exit_code::backend::{ExitCodeHandle, ExitCodeSink};

/// Sink that drops every exit code.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpExitCode;

impl ExitCodeSink for NoOpExitCode {
    #[inline(always)]
    fn set_exit_code(&self, _: &str, _: ExitCode) {}
}

pub fn noop_exit_code() -> ExitCodeHandle {
    Arc::new(NoOpExitCode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpExitCode>(), 0);
    }

    #[test]
    fn noop_handle_accepts_any_code() {
        let sink = noop_exit_code();
        for code in [-1, 0, 1, 255] {
            sink.set_exit_code("diskusage", code);
        }
    }
}
