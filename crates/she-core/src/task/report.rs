use she_model::{EXIT_CODE_OK, ExitCode, Sample, SampleSet};

/// Result of a collection that produced usable output.
#[derive(Debug, Default)]
pub struct Report {
    samples: Vec<Sample>,
    skipped: usize,
    exit_code: ExitCode,
}

impl Report {
    /// Successful report built from parsed samples.
    pub fn new(set: SampleSet) -> Self {
        let (samples, skipped) = set.into_parts();
        Self {
            samples,
            skipped,
            exit_code: EXIT_CODE_OK,
        }
    }

    /// Mark the report as coming from a run that exited with `code`.
    pub fn with_exit_code(mut self, code: ExitCode) -> Self {
        self.exit_code = code;
        self
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Malformed records dropped while parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// `true` when the underlying command exited with zero.
    pub fn is_success(&self) -> bool {
        self.exit_code == EXIT_CODE_OK
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use she_model::MetricDesc;

    use super::*;

    static DESC: MetricDesc = MetricDesc::new("test_metric", "test", &["host"]);

    #[test]
    fn report_keeps_samples_and_skips() {
        let mut set = SampleSet::new();
        set.push(&DESC, ["a"], 1.0);
        set.push(&DESC, ["a", "b"], 2.0);
        set.skip();

        let report = Report::new(set);
        assert!(report.is_success());
        assert_eq!(report.samples().len(), 1);
        assert_eq!(report.skipped(), 2);
    }

    #[test]
    fn non_zero_exit_is_not_success() {
        let report = Report::new(SampleSet::new()).with_exit_code(1);
        assert!(!report.is_success());
        assert_eq!(report.exit_code(), 1);
    }
}
