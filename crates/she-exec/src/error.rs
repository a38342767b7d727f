use std::{io, time::Duration};

use she_model::{EXIT_CODE_FAILED, ExitCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid command: {0}")]
    InvalidSpec(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("'{program}' exited with non-zero status ({})", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        output: Vec<u8>,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ExecError {
    /// Exit code to report for this failure.
    ///
    /// The process status when the command ran to completion, [`EXIT_CODE_FAILED`] otherwise.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ExecError::NonZeroExit {
                code: Some(code), ..
            } if *code != 0 => ExitCode::from(*code),
            _ => EXIT_CODE_FAILED,
        }
    }

    /// Returns `true` if the command was killed by its timeout.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }

    /// Output captured before a non-zero exit, if any.
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            ExecError::NonZeroExit { output, .. } => Some(output),
            _ => None,
        }
    }
}
