use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use she_core::{Report, Task, TaskError};
use she_model::{MetricDesc, SampleSet};

use crate::recon::{Invocation, ReconRunner};

static ALL: MetricDesc = MetricDesc::new(
    "swift_cluster_md5_all",
    "Sum of matched-, not matched md5s and errors as reported by the swift-recon tool.",
    &["kind"],
);
static MATCHED: MetricDesc = MetricDesc::new(
    "swift_cluster_md5_matched",
    "Matched md5s reported by the swift-recon tool.",
    &["kind"],
);
static NOT_MATCHED: MetricDesc = MetricDesc::new(
    "swift_cluster_md5_not_matched",
    "Not matched md5s reported by the swift-recon tool.",
    &["kind"],
);
static ERRORS: MetricDesc = MetricDesc::new(
    "swift_cluster_md5_errors",
    "Errors while checking md5s reported by the swift-recon tool.",
    &["kind"],
);

static DESCS: [&MetricDesc; 4] = [&ALL, &MATCHED, &NOT_MATCHED, &ERRORS];

static CHECKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Checking (\S+) md5sums?").unwrap());
static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)/(\d+) hosts matched, (\d+) error\[s\] while checking hosts").unwrap()
});

/// Ring and `swift.conf` checksum agreement across the cluster (`swift-recon --md5`).
pub struct Md5Task {
    runner: ReconRunner,
}

impl Md5Task {
    pub fn new(runner: ReconRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Task for Md5Task {
    fn name(&self) -> &str {
        "md5"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        // --verbose would print per-host lines we do not use
        let run = self
            .runner
            .query(self.runner.deadline(), None, "--md5", false)
            .await?;
        parse(&run)
    }
}

/// Every `Checking <kind> md5sum(s)` header is followed by one summary line.
fn parse(run: &Invocation) -> Result<Report, TaskError> {
    let mut set = SampleSet::new();
    let mut kind: Option<String> = None;
    let mut summaries = 0usize;

    for line in run.output.lines() {
        if let Some(caps) = CHECKING.captures(line) {
            kind = Some(caps[1].to_string());
            continue;
        }
        let Some(caps) = SUMMARY.captures(line) else {
            continue;
        };
        let Some(kind) = kind.take() else {
            set.skip();
            continue;
        };
        let (Ok(matched), Ok(total), Ok(errors)) = (
            caps[1].parse::<f64>(),
            caps[2].parse::<f64>(),
            caps[3].parse::<f64>(),
        ) else {
            set.skip();
            continue;
        };

        summaries += 1;
        set.push(&ALL, [kind.as_str()], total);
        set.push(&MATCHED, [kind.as_str()], matched);
        set.push(&NOT_MATCHED, [kind.as_str()], total - matched);
        set.push(&ERRORS, [kind.as_str()], errors);
    }

    if summaries == 0 {
        return Err(run.unusable("no md5 summary in output"));
    }
    Ok(Report::new(set).with_exit_code(run.exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\
===============================================================================
--> Starting reconnaissance on 2 hosts (object)
===============================================================================
[2024-05-02 10:00:00] Checking ring md5sums
1/2 hosts matched, 1 error[s] while checking hosts.
===============================================================================
[2024-05-02 10:00:00] Checking swift.conf md5sum
2/2 hosts matched, 0 error[s] while checking hosts.
===============================================================================
";

    fn value(report: &Report, name: &str, kind: &str) -> f64 {
        report
            .samples()
            .iter()
            .find(|s| s.name() == name && s.label_values() == [kind])
            .map(|s| s.value())
            .unwrap()
    }

    #[test]
    fn summary_lines_are_attributed_to_their_kind() {
        let report = parse(&Invocation::fake("--md5", OUTPUT, 1)).unwrap();

        assert_eq!(report.exit_code(), 1);
        assert_eq!(value(&report, "swift_cluster_md5_all", "ring"), 2.0);
        assert_eq!(value(&report, "swift_cluster_md5_matched", "ring"), 1.0);
        assert_eq!(value(&report, "swift_cluster_md5_not_matched", "ring"), 1.0);
        assert_eq!(value(&report, "swift_cluster_md5_errors", "ring"), 1.0);
        assert_eq!(value(&report, "swift_cluster_md5_all", "swift.conf"), 2.0);
        assert_eq!(value(&report, "swift_cluster_md5_not_matched", "swift.conf"), 0.0);
        assert_eq!(report.samples().len(), 8);
    }

    #[test]
    fn output_without_summary_fails() {
        let err = parse(&Invocation::fake("--md5", "Traceback (most recent call last):\n", 0))
            .unwrap_err();
        assert!(matches!(err, TaskError::Parse(_)));
    }
}
