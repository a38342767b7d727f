use async_trait::async_trait;
use serde::Deserialize;
use she_core::{Report, Task, TaskError};
use she_model::{LABEL_STORAGE_IP, MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner};

static AUDIT_ERRORS: MetricDesc = MetricDesc::new(
    "swift_cluster_drives_audit_errors",
    "Drive audit errors reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);

static DESCS: [&MetricDesc; 1] = [&AUDIT_ERRORS];

#[derive(Debug, Deserialize)]
struct DriveAudit {
    drive_audit_errors: Option<f64>,
}

/// Drive audit error counts per storage node (`swift-recon --driveaudit`).
pub struct DriveAuditTask {
    runner: ReconRunner,
}

impl DriveAuditTask {
    pub fn new(runner: ReconRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Task for DriveAuditTask {
    fn name(&self) -> &str {
        "driveaudit"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let run = self
            .runner
            .query(self.runner.deadline(), None, "--driveaudit", true)
            .await?;
        parse(&run)
    }
}

fn parse(run: &Invocation) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    for (host, audit) in run.decode_hosts::<DriveAudit>(&mut set)? {
        if let Some(errors) = audit.drive_audit_errors {
            set.push(&AUDIT_ERRORS, [host], errors);
        }
    }
    Ok(Report::new(set).with_exit_code(run.exit_code))
}
