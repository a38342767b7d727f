use async_trait::async_trait;
use serde_json::Value;
use she_core::{Report, Task, TaskError};
use she_model::{LABEL_STORAGE_IP, MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner};

static UNMOUNTED: MetricDesc = MetricDesc::new(
    "swift_cluster_drives_unmounted",
    "Unmounted drives reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);

static DESCS: [&MetricDesc; 1] = [&UNMOUNTED];

/// Number of unmounted drives per storage node (`swift-recon --unmounted`).
pub struct UnmountedTask {
    runner: ReconRunner,
}

impl UnmountedTask {
    pub fn new(runner: ReconRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Task for UnmountedTask {
    fn name(&self) -> &str {
        "unmounted"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let run = self
            .runner
            .query(self.runner.deadline(), None, "--unmounted", true)
            .await?;
        parse(&run)
    }
}

fn parse(run: &Invocation) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    for (host, drives) in run.decode_hosts::<Vec<Value>>(&mut set)? {
        set.push(&UNMOUNTED, [host], drives.len() as f64);
    }
    Ok(Report::new(set).with_exit_code(run.exit_code))
}
