use async_trait::async_trait;
use serde::Deserialize;
use she_core::{Report, Task, TaskError};
use she_model::{LABEL_STORAGE_IP, MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner, combined_exit_code};

static CONTAINERS_SWEEP: MetricDesc = MetricDesc::new(
    "swift_cluster_containers_updater_sweep_time",
    "Container updater sweep time reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static OBJECTS_SWEEP: MetricDesc = MetricDesc::new(
    "swift_cluster_objects_updater_sweep_time",
    "Object updater sweep time reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);

static DESCS: [&MetricDesc; 2] = [&CONTAINERS_SWEEP, &OBJECTS_SWEEP];

#[derive(Debug, Deserialize)]
struct Sweep {
    container_updater_sweep: Option<f64>,
    object_updater_sweep: Option<f64>,
}

/// Updater sweep time for container and object servers
/// (`swift-recon <type> --updater`, two queries sharing one deadline).
pub struct UpdaterSweepTask {
    runner: ReconRunner,
}

impl UpdaterSweepTask {
    pub fn new(runner: ReconRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Task for UpdaterSweepTask {
    fn name(&self) -> &str {
        "updater_sweep"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let deadline = self.runner.deadline();
        let containers = self
            .runner
            .query(deadline, Some("container"), "--updater", true)
            .await?;
        let objects = self
            .runner
            .query(deadline, Some("object"), "--updater", true)
            .await?;
        parse(&containers, &objects)
    }
}

fn parse(containers: &Invocation, objects: &Invocation) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    for (host, sweep) in containers.decode_hosts::<Sweep>(&mut set)? {
        if let Some(time) = sweep.container_updater_sweep {
            set.push(&CONTAINERS_SWEEP, [host], time);
        }
    }
    for (host, sweep) in objects.decode_hosts::<Sweep>(&mut set)? {
        if let Some(time) = sweep.object_updater_sweep {
            set.push(&OBJECTS_SWEEP, [host], time);
        }
    }
    Ok(Report::new(set).with_exit_code(combined_exit_code([containers, objects])))
}
