use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use she_model::{EXIT_CODE_OK, ExitCode, Sample};

use crate::{error::TaskError, task::Report};

/// Cached outcome of the latest refresh of one task.
///
/// Entries are replaced as a whole; readers hold an `Arc` to a consistent snapshot.
#[derive(Debug, Clone)]
pub struct TaskResult {
    samples: Arc<[Sample]>,
    exit_code: ExitCode,
    reported_exit_code: ExitCode,
    last_error: Option<String>,
    consecutive_failures: u32,
    last_success: Option<SystemTime>,
    refreshed_at: Instant,
}

impl TaskResult {
    /// Fold one collection outcome into the previous entry.
    ///
    /// - clean success: samples replaced, counter reset, reported code back to zero;
    /// - partial report (usable samples, non-zero exit): samples replaced, counter incremented;
    /// - error: previous samples kept, counter incremented.
    ///
    /// The reported code only changes on failure once the counter exceeds `max_failures`.
    pub(crate) fn next(
        prev: Option<&TaskResult>,
        outcome: Result<Report, TaskError>,
        max_failures: u32,
    ) -> Self {
        let failures = prev
            .map_or(0, |p| p.consecutive_failures)
            .saturating_add(1);
        let last_success = prev.and_then(|p| p.last_success);

        match outcome {
            Ok(report) if report.is_success() => Self {
                samples: report.into_samples().into(),
                exit_code: EXIT_CODE_OK,
                reported_exit_code: EXIT_CODE_OK,
                last_error: None,
                consecutive_failures: 0,
                last_success: Some(SystemTime::now()),
                refreshed_at: Instant::now(),
            },
            Ok(report) => {
                let code = report.exit_code();
                Self {
                    reported_exit_code: escalate(prev, failures, max_failures, code),
                    samples: report.into_samples().into(),
                    exit_code: code,
                    last_error: Some(format!("command exited with code {code}")),
                    consecutive_failures: failures,
                    last_success,
                    refreshed_at: Instant::now(),
                }
            }
            Err(err) => {
                let code = err.exit_code();
                Self {
                    samples: prev.map_or_else(|| Arc::from(Vec::new()), |p| Arc::clone(&p.samples)),
                    exit_code: code,
                    reported_exit_code: escalate(prev, failures, max_failures, code),
                    last_error: Some(err.to_string()),
                    consecutive_failures: failures,
                    last_success,
                    refreshed_at: Instant::now(),
                }
            }
        }
    }

    /// Samples served to readers.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Exit code observed on the latest refresh.
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// Exit code exposed through the gauge, after the failure threshold is applied.
    pub fn reported_exit_code(&self) -> ExitCode {
        self.reported_exit_code
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Wall-clock time of the last clean success.
    pub fn last_success(&self) -> Option<SystemTime> {
        self.last_success
    }

    /// Time since this entry was written.
    pub fn age(&self) -> Duration {
        self.refreshed_at.elapsed()
    }

    pub fn is_stale(&self, staleness: Duration) -> bool {
        self.age() >= staleness
    }
}

fn escalate(
    prev: Option<&TaskResult>,
    failures: u32,
    max_failures: u32,
    code: ExitCode,
) -> ExitCode {
    if failures > max_failures {
        code
    } else {
        prev.map_or(EXIT_CODE_OK, |p| p.reported_exit_code)
    }
}

#[cfg(test)]
mod tests {
    use she_model::{MetricDesc, SampleSet};

    use super::*;

    static DESC: MetricDesc = MetricDesc::new("test_value", "test", &[]);

    fn ok(value: f64) -> Result<Report, TaskError> {
        let mut set = SampleSet::new();
        set.push(&DESC, Vec::<String>::new(), value);
        Ok(Report::new(set))
    }

    fn fail(code: ExitCode) -> Result<Report, TaskError> {
        Err(TaskError::Execution {
            reason: "boom".into(),
            exit_code: code,
        })
    }

    fn fold(outcomes: Vec<Result<Report, TaskError>>, max_failures: u32) -> TaskResult {
        let mut current: Option<TaskResult> = None;
        for outcome in outcomes {
            current = Some(TaskResult::next(current.as_ref(), outcome, max_failures));
        }
        current.expect("at least one outcome")
    }

    #[test]
    fn first_failure_without_history_is_tolerated() {
        let result = fold(vec![fail(2)], 1);
        assert_eq!(result.consecutive_failures(), 1);
        assert_eq!(result.exit_code(), 2);
        assert_eq!(result.reported_exit_code(), EXIT_CODE_OK);
        assert!(result.samples().is_empty());
        assert!(result.last_success().is_none());
    }

    #[test]
    fn code_is_reported_once_counter_exceeds_threshold() {
        let result = fold(vec![fail(2), fail(2)], 2);
        assert_eq!(result.reported_exit_code(), EXIT_CODE_OK);

        let result = fold(vec![fail(2), fail(2), fail(3)], 2);
        assert_eq!(result.consecutive_failures(), 3);
        assert_eq!(result.reported_exit_code(), 3);
    }

    #[test]
    fn zero_threshold_reports_first_failure() {
        let result = fold(vec![ok(1.0), fail(7)], 0);
        assert_eq!(result.reported_exit_code(), 7);
    }

    #[test]
    fn success_resets_counter_and_reported_code() {
        let result = fold(vec![fail(1), fail(1), fail(1), ok(5.0)], 1);
        assert_eq!(result.consecutive_failures(), 0);
        assert_eq!(result.reported_exit_code(), EXIT_CODE_OK);
        assert!(result.last_error().is_none());
        assert!(result.last_success().is_some());

        let result = fold(vec![fail(1), fail(1), ok(5.0), fail(1)], 1);
        assert_eq!(result.consecutive_failures(), 1);
        assert_eq!(result.reported_exit_code(), EXIT_CODE_OK);
    }

    #[test]
    fn failure_keeps_previous_samples() {
        let result = fold(vec![ok(42.0), fail(1), fail(1)], 4);
        assert_eq!(result.samples().len(), 1);
        assert_eq!(result.samples()[0].value(), 42.0);
        assert!(result.last_success().is_some());
        assert_eq!(result.last_error(), Some("execution error: boom"));
    }

    #[test]
    fn partial_report_replaces_samples_and_counts_failure() {
        let partial = ok(9.0).map(|r| r.with_exit_code(1));
        let result = fold(vec![ok(42.0), partial], 0);
        assert_eq!(result.samples()[0].value(), 9.0);
        assert_eq!(result.consecutive_failures(), 1);
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.reported_exit_code(), 1);
    }

    #[test]
    fn fresh_entry_is_not_stale() {
        let result = fold(vec![ok(1.0)], 0);
        assert!(!result.is_stale(Duration::from_secs(60)));
        assert!(result.is_stale(Duration::ZERO));
    }
}
