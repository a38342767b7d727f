use std::io;

use tokio::{
    io::AsyncReadExt,
    process::{ChildStderr, ChildStdout},
};

const READ_CHUNK: usize = 4096;

/// Drain stdout and stderr concurrently into one buffer.
///
/// Chunks are appended in the order they arrive, so diagnostics printed on
/// stderr stay next to the data they refer to.
pub(crate) async fn read_combined(
    mut stdout: ChildStdout,
    mut stderr: ChildStderr,
) -> io::Result<Vec<u8>> {
    let mut combined = Vec::new();
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read? {
                0 => out_open = false,
                n => combined.extend_from_slice(&out_buf[..n]),
            },
            read = stderr.read(&mut err_buf), if err_open => match read? {
                0 => err_open = false,
                n => combined.extend_from_slice(&err_buf[..n]),
            },
        }
    }
    Ok(combined)
}
