use std::{
    fmt,
    path::PathBuf,
    time::Duration,
};

use tracing::trace;

use crate::{ExecError, command::runner::run_with_timeout};

/// One external command invocation: program, arguments and its hard timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to run (absolute path or a name resolved through `PATH`).
    program: PathBuf,
    /// Command-line arguments passed to the program.
    args: Vec<String>,
    /// Wall-clock limit for the whole invocation.
    timeout: Duration,
}

impl CommandSpec {
    /// Create a command without arguments.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replace the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Space separated argument string, used to identify the invocation in logs.
    pub fn query(&self) -> String {
        self.args.join(" ")
    }

    /// Validate the command before spawning it.
    ///
    /// Rules:
    /// - `program` is not empty or whitespace-only;
    /// - `timeout` is non-zero.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.program.to_string_lossy().trim().is_empty() {
            return Err(ExecError::InvalidSpec("program is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(ExecError::InvalidSpec(format!(
                "timeout for '{}' is zero",
                self.program.display()
            )));
        }
        Ok(())
    }

    /// Validate and run the command, returning its combined output.
    pub async fn run(&self) -> Result<Vec<u8>, ExecError> {
        self.validate()?;
        trace!(
            program = %self.program.display(),
            query = %self.query(),
            timeout_ms = self.timeout.as_millis() as u64,
            "command resolved"
        );
        run_with_timeout(self.timeout, &self.program, self.args.as_slice()).await
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program.display())
        } else {
            write!(f, "{} {}", self.program.display(), self.query())
        }
    }
}
