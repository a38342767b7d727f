use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Flag, TimeoutMs},
    error::{ModelError, ModelResult},
};

/// Execution options shared by every `swift-recon` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconOpts {
    /// Whether recon tasks are registered at all.
    pub enabled: Flag,
    /// Path to the `swift-recon` executable.
    pub path_to_executable: PathBuf,
    /// Per-host request timeout handed to the tool as `--timeout=<secs>`.
    pub host_timeout_secs: u64,
    /// Deadline for one whole collection, across all commands a task issues.
    pub ctx_timeout_ms: TimeoutMs,
    /// Individual checks.
    pub tasks: ReconTasks,
}

impl Default for ReconOpts {
    fn default() -> Self {
        Self {
            enabled: Flag::enabled(),
            path_to_executable: PathBuf::from("swift-recon"),
            host_timeout_secs: 1,
            ctx_timeout_ms: 4_000,
            tasks: ReconTasks::default(),
        }
    }
}

impl ReconOpts {
    /// Options pointing at `path` with every other field defaulted.
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            path_to_executable: path.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn ctx_timeout(&self) -> Duration {
        Duration::from_millis(self.ctx_timeout_ms)
    }

    /// Validate the options.
    ///
    /// Rules:
    /// - `path_to_executable` is not empty;
    /// - both timeouts are non-zero;
    /// - the per-host timeout fits into the context timeout.
    pub fn validate(&self) -> ModelResult<()> {
        if self.path_to_executable.as_os_str().is_empty() {
            return Err(ModelError::Invalid("recon.path_to_executable is empty".into()));
        }
        if self.host_timeout_secs == 0 {
            return Err(ModelError::Invalid("recon.host_timeout_secs cannot be zero".into()));
        }
        if self.ctx_timeout_ms == 0 {
            return Err(ModelError::Invalid("recon.ctx_timeout_ms cannot be zero".into()));
        }
        if self.host_timeout_secs.saturating_mul(1_000) > self.ctx_timeout_ms {
            return Err(ModelError::Invalid(format!(
                "recon.host_timeout_secs ({}s) exceeds recon.ctx_timeout_ms ({}ms)",
                self.host_timeout_secs, self.ctx_timeout_ms
            )));
        }
        Ok(())
    }
}

/// Per-check switches for the recon family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconTasks {
    pub disk_usage: Flag,
    pub drive_audit: Flag,
    pub md5: Flag,
    pub quarantined: Flag,
    pub replication: Flag,
    pub unmounted: Flag,
    pub updater_sweep: Flag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_check() {
        let opts = ReconOpts::default();

        assert!(opts.enabled.is_enabled());
        assert_eq!(opts.path_to_executable, PathBuf::from("swift-recon"));
        assert_eq!(opts.ctx_timeout(), Duration::from_secs(4));
        assert!(opts.tasks.disk_usage.is_enabled());
        assert!(opts.tasks.updater_sweep.is_enabled());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn single_check_can_be_switched_off() {
        let json = r#"{"path_to_executable": "/opt/swift/bin/swift-recon", "tasks": {"md5": false}}"#;
        let opts: ReconOpts = serde_json::from_str(json).unwrap();

        assert_eq!(
            opts.path_to_executable,
            PathBuf::from("/opt/swift/bin/swift-recon")
        );
        assert!(!opts.tasks.md5.is_enabled());
        assert!(opts.tasks.replication.is_enabled());
    }

    #[test]
    fn rejects_host_timeout_longer_than_context() {
        let opts = ReconOpts {
            host_timeout_secs: 10,
            ctx_timeout_ms: 4_000,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rejects_empty_executable() {
        let opts = ReconOpts::with_executable("");
        assert!(opts.validate().is_err());
    }
}
