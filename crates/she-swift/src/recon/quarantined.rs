use async_trait::async_trait;
use serde::Deserialize;
use she_core::{Report, Task, TaskError};
use she_model::{LABEL_STORAGE_IP, MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner};

static OBJECTS: MetricDesc = MetricDesc::new(
    "swift_cluster_objects_quarantined",
    "Quarantined objects reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static CONTAINERS: MetricDesc = MetricDesc::new(
    "swift_cluster_containers_quarantined",
    "Quarantined containers reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);
static ACCOUNTS: MetricDesc = MetricDesc::new(
    "swift_cluster_accounts_quarantined",
    "Quarantined accounts reported by the swift-recon tool.",
    &[LABEL_STORAGE_IP],
);

static DESCS: [&MetricDesc; 3] = [&OBJECTS, &CONTAINERS, &ACCOUNTS];

/// `--quarantined` payload; per-policy breakdowns are ignored.
#[derive(Debug, Deserialize)]
struct Quarantined {
    objects: Option<f64>,
    containers: Option<f64>,
    accounts: Option<f64>,
}

/// Quarantined object, container and account counts (`swift-recon --quarantined`).
pub struct QuarantinedTask {
    runner: ReconRunner,
}

impl QuarantinedTask {
    pub fn new(runner: ReconRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Task for QuarantinedTask {
    fn name(&self) -> &str {
        "quarantined"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let run = self
            .runner
            .query(self.runner.deadline(), None, "--quarantined", true)
            .await?;
        parse(&run)
    }
}

fn parse(run: &Invocation) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    for (host, counts) in run.decode_hosts::<Quarantined>(&mut set)? {
        for (desc, value) in [
            (&OBJECTS, counts.objects),
            (&CONTAINERS, counts.containers),
            (&ACCOUNTS, counts.accounts),
        ] {
            if let Some(value) = value {
                set.push(desc, [host.as_str()], value);
            }
        }
    }
    Ok(Report::new(set).with_exit_code(run.exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_count_becomes_a_sample() {
        let run = Invocation::fake(
            "--quarantined",
            r#"-> http://10.0.0.1:6000/recon/quarantined: {"objects": 1, "accounts": 0, "containers": 2, "policies": {"0": {"objects": 1}}}
-> http://10.0.0.2:6000/recon/quarantined: {"objects": null, "accounts": 4, "containers": 0}
"#,
            0,
        );
        let report = parse(&run).unwrap();

        let got: Vec<(&str, String, f64)> = report
            .samples()
            .iter()
            .map(|s| (s.name(), s.label_values()[0].clone(), s.value()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("swift_cluster_objects_quarantined", "10.0.0.1".to_string(), 1.0),
                ("swift_cluster_containers_quarantined", "10.0.0.1".to_string(), 2.0),
                ("swift_cluster_accounts_quarantined", "10.0.0.1".to_string(), 0.0),
                ("swift_cluster_containers_quarantined", "10.0.0.2".to_string(), 0.0),
                ("swift_cluster_accounts_quarantined", "10.0.0.2".to_string(), 4.0),
            ]
        );
    }
}
