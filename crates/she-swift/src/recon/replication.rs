use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use she_core::{Report, Task, TaskError};
use she_model::{LABEL_STORAGE_IP, MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner, combined_exit_code};

/// Source of "now" in seconds since the Unix epoch.
pub type Clock = fn() -> f64;

pub fn system_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

static ACCOUNTS_AGE: MetricDesc = MetricDesc::new(
    "swift_cluster_accounts_replication_age",
    "Account replication age reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static ACCOUNTS_DURATION: MetricDesc = MetricDesc::new(
    "swift_cluster_accounts_replication_duration",
    "Account replication duration reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static CONTAINERS_AGE: MetricDesc = MetricDesc::new(
    "swift_cluster_containers_replication_age",
    "Container replication age reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static CONTAINERS_DURATION: MetricDesc = MetricDesc::new(
    "swift_cluster_containers_replication_duration",
    "Container replication duration reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static OBJECTS_AGE: MetricDesc = MetricDesc::new(
    "swift_cluster_objects_replication_age",
    "Object replication age reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static OBJECTS_DURATION: MetricDesc = MetricDesc::new(
    "swift_cluster_objects_replication_duration",
    "Object replication duration reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);

static DESCS: [&MetricDesc; 6] = [
    &ACCOUNTS_AGE,
    &ACCOUNTS_DURATION,
    &CONTAINERS_AGE,
    &CONTAINERS_DURATION,
    &OBJECTS_AGE,
    &OBJECTS_DURATION,
];

/// Server types queried, with the families each one feeds.
static SERVERS: [(&str, &MetricDesc, &MetricDesc); 3] = [
    ("account", &ACCOUNTS_AGE, &ACCOUNTS_DURATION),
    ("container", &CONTAINERS_AGE, &CONTAINERS_DURATION),
    ("object", &OBJECTS_AGE, &OBJECTS_DURATION),
];

/// `--replication` payload. Object servers may report under `object_`-prefixed keys.
#[derive(Debug, Deserialize)]
struct Replication {
    replication_last: Option<f64>,
    replication_time: Option<f64>,
    object_replication_last: Option<f64>,
    object_replication_time: Option<f64>,
}

impl Replication {
    fn last(&self) -> Option<f64> {
        self.replication_last.or(self.object_replication_last)
    }

    fn time(&self) -> Option<f64> {
        self.replication_time.or(self.object_replication_time)
    }
}

/// Replication age and duration for account, container and object servers
/// (`swift-recon <type> --replication`, three queries sharing one deadline).
pub struct ReplicationTask {
    runner: ReconRunner,
    clock: Clock,
}

impl ReplicationTask {
    pub fn new(runner: ReconRunner) -> Self {
        Self {
            runner,
            clock: system_clock,
        }
    }

    /// Replace the clock used to compute replication age.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl Task for ReplicationTask {
    fn name(&self) -> &str {
        "replication"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let deadline = self.runner.deadline();
        let mut runs = Vec::with_capacity(SERVERS.len());
        for (server, _, _) in &SERVERS {
            runs.push(
                self.runner
                    .query(deadline, Some(*server), "--replication", true)
                    .await?,
            );
        }
        parse(&runs, (self.clock)())
    }
}

/// `runs` holds one invocation per entry of [`SERVERS`], in order.
fn parse(runs: &[Invocation], now: f64) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    for (run, &(_, age, duration)) in runs.iter().zip(&SERVERS) {
        for (host, stats) in run.decode_hosts::<Replication>(&mut set)? {
            if let Some(last) = stats.last() {
                set.push(age, [host.as_str()], now - last);
            }
            if let Some(time) = stats.time() {
                set.push(duration, [host.as_str()], time);
            }
        }
    }
    Ok(Report::new(set).with_exit_code(combined_exit_code(runs)))
}
