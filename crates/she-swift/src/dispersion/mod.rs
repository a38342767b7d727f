use std::{
    path::PathBuf,
    sync::{Arc, LazyLock},
    time::Duration,
};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use she_core::{Report, Task, TaskError, TaskRef};
use she_exec::CommandSpec;
use she_model::{DispersionOpts, EXIT_CODE_OK, ExitCode, LABEL_TASK, MetricDesc, SampleSet};
use tracing::debug;

/// Exit code of the latest `swift-dispersion-report` run.
pub static EXIT_CODE: MetricDesc = MetricDesc::new(
    "swift_dispersion_task_exit_code",
    "The exit code for a Swift Dispersion Report query execution.",
    &[LABEL_TASK],
);

static CONTAINER_EXPECTED: MetricDesc = MetricDesc::new(
    "swift_dispersion_container_copies_expected",
    "Expected container copies reported by the swift-dispersion-report tool.",
    &[],
);
static CONTAINER_FOUND: MetricDesc = MetricDesc::new(
    "swift_dispersion_container_copies_found",
    "Found container copies reported by the swift-dispersion-report tool.",
    &[],
);
static CONTAINER_MISSING: MetricDesc = MetricDesc::new(
    "swift_dispersion_container_copies_missing",
    "Missing container copies reported by the swift-dispersion-report tool.",
    &[],
);
static CONTAINER_OVERLAPPING: MetricDesc = MetricDesc::new(
    "swift_dispersion_container_overlapping",
    "Overlapping container partitions reported by the swift-dispersion-report tool.",
    &[],
);
static OBJECT_EXPECTED: MetricDesc = MetricDesc::new(
    "swift_dispersion_object_copies_expected",
    "Expected object copies reported by the swift-dispersion-report tool.",
    &[],
);
static OBJECT_FOUND: MetricDesc = MetricDesc::new(
    "swift_dispersion_object_copies_found",
    "Found object copies reported by the swift-dispersion-report tool.",
    &[],
);
static OBJECT_MISSING: MetricDesc = MetricDesc::new(
    "swift_dispersion_object_copies_missing",
    "Missing object copies reported by the swift-dispersion-report tool.",
    &[],
);
static OBJECT_OVERLAPPING: MetricDesc = MetricDesc::new(
    "swift_dispersion_object_overlapping",
    "Overlapping object partitions reported by the swift-dispersion-report tool.",
    &[],
);

static DESCS: [&MetricDesc; 8] = [
    &CONTAINER_EXPECTED,
    &CONTAINER_FOUND,
    &CONTAINER_MISSING,
    &CONTAINER_OVERLAPPING,
    &OBJECT_EXPECTED,
    &OBJECT_FOUND,
    &OBJECT_MISSING,
    &OBJECT_OVERLAPPING,
];

const NO_LABELS: [&str; 0] = [];

/// The report is the first JSON object line with a container or object section;
/// anything else is tool logging.
static JSON_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\{.*\}\s*$").unwrap());

#[derive(Debug, Deserialize)]
struct DispersionReport {
    container: Option<Copies>,
    object: Option<Copies>,
}

#[derive(Debug, Deserialize)]
struct Copies {
    copies_expected: f64,
    copies_found: f64,
    #[serde(default)]
    overlapping: f64,
}

/// Build the dispersion task if it is enabled in `opts`.
pub fn dispersion_task(opts: &DispersionOpts) -> Option<TaskRef> {
    opts.enabled
        .is_enabled()
        .then(|| Arc::new(DispersionTask::from_opts(opts)) as TaskRef)
}

/// Container and object replica placement (`swift-dispersion-report --dump-json`).
pub struct DispersionTask {
    program: PathBuf,
    timeout: Duration,
}

impl DispersionTask {
    pub fn from_opts(opts: &DispersionOpts) -> Self {
        Self {
            program: opts.path_to_executable.clone(),
            timeout: opts.timeout(),
        }
    }
}

#[async_trait]
impl Task for DispersionTask {
    fn name(&self) -> &str {
        "dispersion-report"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &DESCS
    }

    async fn collect(&self) -> Result<Report, TaskError> {
        let spec = CommandSpec::new(&self.program, self.timeout).arg("--dump-json");
        let (output, exit_code) = match spec.run().await {
            Ok(output) => (output, EXIT_CODE_OK),
            Err(err) => match err.output() {
                Some(output) => (output.to_vec(), err.exit_code()),
                None => return Err(err.into()),
            },
        };
        debug!(exit_code, bytes = output.len(), "dispersion report finished");
        parse(&String::from_utf8_lossy(&output), exit_code)
    }
}

fn parse(output: &str, exit_code: ExitCode) -> Result<Report, TaskError> {
    let unusable = |reason: String| {
        if exit_code == EXIT_CODE_OK {
            TaskError::Parse(reason)
        } else {
            TaskError::Execution { reason, exit_code }
        }
    };

    let mut rejected: Option<String> = None;
    let report = JSON_LINE.find_iter(output).find_map(|line| {
        match serde_json::from_str::<DispersionReport>(line.as_str()) {
            Ok(report) if report.container.is_some() || report.object.is_some() => Some(report),
            Ok(_) => {
                rejected = Some("dispersion report has neither container nor object section".into());
                None
            }
            Err(e) => {
                rejected = Some(format!("invalid dispersion report: {e}"));
                None
            }
        }
    });
    let Some(report) = report else {
        return Err(unusable(rejected.unwrap_or_else(|| {
            "no JSON report in swift-dispersion-report output".into()
        })));
    };

    let mut set = SampleSet::new();
    let kinds = [
        (
            report.container,
            [&CONTAINER_EXPECTED, &CONTAINER_FOUND, &CONTAINER_MISSING, &CONTAINER_OVERLAPPING],
        ),
        (
            report.object,
            [&OBJECT_EXPECTED, &OBJECT_FOUND, &OBJECT_MISSING, &OBJECT_OVERLAPPING],
        ),
    ];
    for (copies, [expected, found, missing, overlapping]) in kinds {
        let Some(copies) = copies else {
            continue;
        };
        set.push(expected, NO_LABELS, copies.copies_expected);
        set.push(found, NO_LABELS, copies.copies_found);
        set.push(missing, NO_LABELS, copies.copies_expected - copies.copies_found);
        set.push(overlapping, NO_LABELS, copies.overlapping);
    }
    Ok(Report::new(set).with_exit_code(exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"Using storage policy: default
{"object": {"retries": 0, "missing_two": 0, "copies_found": 12, "missing_one": 0, "copies_expected": 12, "pct_found": 100.0, "overlapping": 0, "missing_all": 0}, "container": {"retries": 0, "missing_two": 0, "copies_found": 9, "missing_one": 1, "copies_expected": 10, "pct_found": 90.0, "overlapping": 1, "missing_all": 0}}
"#;

    fn value(report: &Report, name: &str) -> f64 {
        report
            .samples()
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.value())
            .unwrap()
    }

    #[test]
    fn report_line_is_found_after_log_lines() {
        let report = parse(OUTPUT, 0).unwrap();
        assert_eq!(report.samples().len(), 8);
        assert_eq!(value(&report, "swift_dispersion_container_copies_expected"), 10.0);
        assert_eq!(value(&report, "swift_dispersion_container_copies_missing"), 1.0);
        assert_eq!(value(&report, "swift_dispersion_container_overlapping"), 1.0);
        assert_eq!(value(&report, "swift_dispersion_object_copies_missing"), 0.0);
    }

    #[test]
    fn json_log_lines_before_the_report_are_ignored() {
        let output = format!(
            "{{\"level\": \"info\", \"msg\": \"sampling\"}}\n{{\"broken\": }}\n{OUTPUT}"
        );
        let report = parse(&output, 0).unwrap();
        assert_eq!(report.samples().len(), 8);
        assert_eq!(value(&report, "swift_dispersion_object_copies_found"), 12.0);
    }

    #[test]
    fn json_without_sections_is_not_a_report() {
        let err = parse("{\"level\": \"info\"}\n", 0).unwrap_err();
        assert!(matches!(err, TaskError::Parse(msg) if msg.contains("neither container nor object")));
    }

    #[test]
    fn error_output_without_report() {
        let output = "ERROR: 10.0.0.2:6000/sdb: [Errno 111] ECONNREFUSED\n";
        assert!(matches!(
            parse(output, 1),
            Err(TaskError::Execution { exit_code: 1, .. })
        ));
        assert!(matches!(parse(output, 0), Err(TaskError::Parse(_))));
    }

    #[test]
    fn disabled_task_is_not_built() {
        let mut opts = DispersionOpts::default();
        assert_eq!(dispersion_task(&opts).unwrap().name(), "dispersion-report");
        opts.enabled = she_model::Flag::disabled();
        assert!(dispersion_task(&opts).is_none());
    }

    #[tokio::test]
    async fn collect_runs_the_tool_with_dump_json() {
        let opts = DispersionOpts::with_executable("echo");
        let err = DispersionTask::from_opts(&opts).collect().await.unwrap_err();
        // echo prints "--dump-json", which is not a report
        assert!(matches!(err, TaskError::Parse(msg) if msg.contains("no JSON report")));
    }
}
