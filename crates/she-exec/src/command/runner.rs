use std::{ffi::OsStr, io, path::Path, process::Stdio, time::Duration};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::{ExecError, command::output::read_combined};

/// Run `program args...` and return its combined stdout/stderr.
///
/// - The process is killed when `timeout` expires; the call then fails with [`ExecError::Timeout`].
/// - A non-zero exit fails with [`ExecError::NonZeroExit`], which still carries the captured output.
/// - A binary that cannot be started fails with [`ExecError::Spawn`].
pub async fn run_with_timeout<P, A>(
    timeout: Duration,
    program: P,
    args: &[A],
) -> Result<Vec<u8>, ExecError>
where
    P: AsRef<Path>,
    A: AsRef<OsStr>,
{
    let program = program.as_ref();
    let name = program.display().to_string();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    trace!(program = %name, timeout_ms = timeout.as_millis() as u64, "spawning command");
    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: name.clone(),
        source,
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr was not captured"))?;

    let exec = async {
        let output = read_combined(stdout, stderr).await?;
        let status = child.wait().await?;
        Ok::<_, io::Error>((output, status))
    };
    let finished = tokio::time::timeout(timeout, exec).await;

    match finished {
        Ok(Ok((output, status))) if status.success() => {
            debug!(program = %name, bytes = output.len(), "command finished");
            Ok(output)
        }
        Ok(Ok((output, status))) => Err(ExecError::NonZeroExit {
            program: name,
            code: status.code(),
            output,
        }),
        Ok(Err(e)) => Err(ExecError::Io(e)),
        Err(_) => {
            debug!(program = %name, "timeout reached; killing command");
            if let Err(e) = child.kill().await {
                debug!("failed to kill command: {e}");
            }
            Err(ExecError::Timeout {
                program: name,
                timeout,
            })
        }
    }
}
