use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Flag, TimeoutMs},
    error::{ModelError, ModelResult},
};

/// Execution options for the `swift-dispersion-report` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispersionOpts {
    /// Whether the dispersion task is registered.
    pub enabled: Flag,
    /// Path to the `swift-dispersion-report` executable.
    pub path_to_executable: PathBuf,
    /// Hard timeout for one report run.
    pub timeout_ms: TimeoutMs,
}

impl Default for DispersionOpts {
    fn default() -> Self {
        Self {
            enabled: Flag::enabled(),
            path_to_executable: PathBuf::from("swift-dispersion-report"),
            timeout_ms: 20_000,
        }
    }
}

impl DispersionOpts {
    /// Options pointing at `path` with every other field defaulted.
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            path_to_executable: path.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.path_to_executable.as_os_str().is_empty() {
            return Err(ModelError::Invalid(
                "dispersion.path_to_executable is empty".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ModelError::Invalid("dispersion.timeout_ms cannot be zero".into()));
        }
        Ok(())
    }
}
