use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use she_core::{Report, Task, TaskError};
use she_model::{LABEL_STORAGE_IP, MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner};

static CAPACITY: MetricDesc = MetricDesc::new(
    "swift_cluster_storage_capacity_bytes",
    "Capacity storage bytes as reported by the swift-recon tool.",
    &[],
);
static USED: MetricDesc = MetricDesc::new(
    "swift_cluster_storage_used_bytes",
    "Used storage bytes as reported by the swift-recon tool.",
    &[],
);
static FREE: MetricDesc = MetricDesc::new(
    "swift_cluster_storage_free_bytes",
    "Free storage bytes as reported by the swift-recon tool.",
    &[],
);
static USED_PERCENT: MetricDesc = MetricDesc::new(
    "swift_cluster_storage_used_percent",
    "Percentage of storage used as reported by the swift-recon tool.",
    &[],
);
static USED_PERCENT_BY_DISK: MetricDesc = MetricDesc::new(
    "swift_cluster_storage_used_percent_by_disk",
    "Percentage of storage used by a disk as reported by the swift-recon tool.",
    &["disk", LABEL_STORAGE_IP],
);

const NO_LABELS: [&str; 0] = [];

static DESCS: [&MetricDesc; 5] = [&CAPACITY, &USED, &FREE, &USED_PERCENT, &USED_PERCENT_BY_DISK];

/// One entry of the `--diskusage` payload.
///
/// Unmounted disks report empty strings instead of numbers, so sizes stay loosely typed.
#[derive(Debug, Deserialize)]
struct Disk {
    #[serde(default)]
    device: String,
    #[serde(default)]
    mounted: bool,
    #[serde(default)]
    size: Value,
    #[serde(default)]
    used: Value,
    #[serde(default)]
    avail: Value,
}

/// Cluster-wide and per-disk storage usage (`swift-recon --diskusage`).
pub struct DiskUsageTask {
    runner: ReconRunner,
}

impl DiskUsageTask {
    pub fn new(runner: ReconRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Task for DiskUsageTask {
    fn name(&self) -> &str {
        "diskusage"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let run = self
            .runner
            .query(self.runner.deadline(), None, "--diskusage", true)
            .await?;
        parse(&run)
    }
}

fn parse(run: &Invocation) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    let hosts = run.decode_hosts::<Vec<Disk>>(&mut set)?;

    let (mut capacity, mut used, mut free) = (0.0, 0.0, 0.0);
    for (host, disks) in &hosts {
        for disk in disks.iter().filter(|d| d.mounted) {
            let (Some(size), Some(disk_used), Some(avail)) =
                (disk.size.as_f64(), disk.used.as_f64(), disk.avail.as_f64())
            else {
                set.skip();
                continue;
            };
            capacity += size;
            used += disk_used;
            free += avail;
            if size > 0.0 {
                set.push(
                    &USED_PERCENT_BY_DISK,
                    [disk.device.as_str(), host.as_str()],
                    disk_used / size * 100.0,
                );
            }
        }
    }

    set.push(&CAPACITY, NO_LABELS, capacity);
    set.push(&USED, NO_LABELS, used);
    set.push(&FREE, NO_LABELS, free);
    if capacity > 0.0 {
        set.push(&USED_PERCENT, NO_LABELS, used / capacity * 100.0);
    }
    Ok(Report::new(set).with_exit_code(run.exit_code))
}
