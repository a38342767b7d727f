mod disk_usage;
pub use disk_usage::DiskUsageTask;

mod drive_audit;
pub use drive_audit::DriveAuditTask;

mod md5;
pub use md5::Md5Task;

mod quarantined;
pub use quarantined::QuarantinedTask;

mod replication;
pub use replication::{Clock, ReplicationTask, system_clock};

mod unmounted;
pub use unmounted::UnmountedTask;

mod updater_sweep;
pub use updater_sweep::UpdaterSweepTask;

use std::{
    path::PathBuf,
    sync::{Arc, LazyLock},
    time::{Duration, Instant},
};

use regex::Regex;
use serde::de::DeserializeOwned;
use she_core::{TaskError, TaskRef};
use she_exec::CommandSpec;
use she_model::{EXIT_CODE_OK, ExitCode, LABEL_TASK, MetricDesc, ReconOpts, SampleSet};
use tracing::{debug, warn};

/// Exit code of the latest `swift-recon` query, per task.
pub static EXIT_CODE: MetricDesc = MetricDesc::new(
    "swift_recon_task_exit_code",
    "The exit code for a Swift Recon query execution.",
    &[LABEL_TASK],
);

/// `-> http://<host>:<port>/recon/<check>: <payload>`; IPv6 hosts are bracketed.
static HOST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-> https?://(?:\[([^\]\s]+)\]|([^:/\s]+))\S*\s+(.+)$").unwrap()
});

/// Build every recon task enabled in `opts`.
pub fn recon_tasks(opts: &ReconOpts) -> Vec<TaskRef> {
    let runner = ReconRunner::from_opts(opts);
    let checks = &opts.tasks;
    let mut tasks: Vec<TaskRef> = Vec::new();

    if checks.disk_usage.is_enabled() {
        tasks.push(Arc::new(DiskUsageTask::new(runner.clone())));
    }
    if checks.drive_audit.is_enabled() {
        tasks.push(Arc::new(DriveAuditTask::new(runner.clone())));
    }
    if checks.md5.is_enabled() {
        tasks.push(Arc::new(Md5Task::new(runner.clone())));
    }
    if checks.quarantined.is_enabled() {
        tasks.push(Arc::new(QuarantinedTask::new(runner.clone())));
    }
    if checks.replication.is_enabled() {
        tasks.push(Arc::new(ReplicationTask::new(runner.clone())));
    }
    if checks.unmounted.is_enabled() {
        tasks.push(Arc::new(UnmountedTask::new(runner.clone())));
    }
    if checks.updater_sweep.is_enabled() {
        tasks.push(Arc::new(UpdaterSweepTask::new(runner)));
    }
    tasks
}

/// Shared `swift-recon` invocation settings.
#[derive(Debug, Clone)]
pub struct ReconRunner {
    program: PathBuf,
    host_timeout_secs: u64,
    ctx_timeout: Duration,
}

impl ReconRunner {
    pub fn from_opts(opts: &ReconOpts) -> Self {
        Self {
            program: opts.path_to_executable.clone(),
            host_timeout_secs: opts.host_timeout_secs,
            ctx_timeout: opts.ctx_timeout(),
        }
    }

    /// Deadline for one collection started now.
    pub(crate) fn deadline(&self) -> Instant {
        Instant::now() + self.ctx_timeout
    }

    /// Run `swift-recon [server_type] --timeout=<secs> [--verbose] <flag>`.
    ///
    /// A non-zero exit is not an error here: the output is returned together with the
    /// exit code so partially reachable clusters still produce samples.
    pub(crate) async fn query(
        &self,
        deadline: Instant,
        server_type: Option<&str>,
        flag: &str,
        verbose: bool,
    ) -> Result<Invocation, TaskError> {
        let mut spec = CommandSpec::new(&self.program, Duration::ZERO)
            .args(server_type)
            .arg(format!("--timeout={}", self.host_timeout_secs));
        if verbose {
            spec = spec.arg("--verbose");
        }
        let spec = spec.arg(flag);
        let query = spec.query();

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(TaskError::Timeout(format!(
                "no time left to run 'swift-recon {query}'"
            )));
        }

        let (output, exit_code) = match spec.with_timeout(remaining).run().await {
            Ok(output) => (output, EXIT_CODE_OK),
            Err(err) => match err.output() {
                Some(output) => (output.to_vec(), err.exit_code()),
                None => return Err(err.into()),
            },
        };
        debug!(query, exit_code, bytes = output.len(), "recon query finished");

        Ok(Invocation {
            query,
            output: String::from_utf8_lossy(&output).into_owned(),
            exit_code,
        })
    }
}

/// Captured output of one recon query.
#[derive(Debug, Clone)]
pub(crate) struct Invocation {
    pub query: String,
    pub output: String,
    pub exit_code: ExitCode,
}

impl Invocation {
    #[cfg(test)]
    pub(crate) fn fake(query: &str, output: &str, exit_code: ExitCode) -> Self {
        Self {
            query: query.to_string(),
            output: output.to_string(),
            exit_code,
        }
    }

    /// Error for output that yielded nothing usable.
    ///
    /// A failed command is reported as such; a successful one with garbage output is a parse error.
    pub(crate) fn unusable(&self, reason: impl std::fmt::Display) -> TaskError {
        if self.exit_code == EXIT_CODE_OK {
            TaskError::Parse(format!("swift-recon {}: {reason}", self.query))
        } else {
            TaskError::Execution {
                reason: format!("swift-recon {}: {reason}", self.query),
                exit_code: self.exit_code,
            }
        }
    }

    /// Decode the payload of every host line as `T`.
    ///
    /// Payloads that do not decode (e.g. `<urlopen error ...>`) are logged and counted as
    /// skipped in `set`. Fails when no host line decodes.
    pub(crate) fn decode_hosts<T: DeserializeOwned>(
        &self,
        set: &mut SampleSet,
    ) -> Result<Vec<(String, T)>, TaskError> {
        let mut seen = 0usize;
        let mut decoded = Vec::new();

        for caps in self
            .output
            .lines()
            .filter_map(|line| HOST_LINE.captures(line.trim_end()))
        {
            seen += 1;
            let Some(host) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
                continue;
            };
            match serde_json::from_str::<T>(&caps[3]) {
                Ok(payload) => decoded.push((host.to_string(), payload)),
                Err(e) => {
                    warn!(query = %self.query, host, error = %e, "skipping host payload");
                    set.skip();
                }
            }
        }

        if decoded.is_empty() {
            return Err(match seen {
                0 => self.unusable("no host lines in output"),
                n => self.unusable(format_args!("none of {n} host payloads could be decoded")),
            });
        }
        Ok(decoded)
    }
}

/// First non-zero exit code of a multi-query collection.
pub(crate) fn combined_exit_code<'a>(runs: impl IntoIterator<Item = &'a Invocation>) -> ExitCode {
    runs.into_iter()
        .map(|r| r.exit_code)
        .find(|code| *code != EXIT_CODE_OK)
        .unwrap_or(EXIT_CODE_OK)
}
