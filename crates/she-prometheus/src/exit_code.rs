use prometheus::{IntGaugeVec, Opts, Registry};
use she_core::ExitCodeSink;
use she_model::{ExitCode, MetricDesc};

/// Exit-code gauge of one task family (e.g. `swift_recon_task_exit_code{task}`).
///
/// Cloning is cheap; clones share the underlying series.
#[derive(Clone)]
pub struct ExitCodeGauge {
    gauge: IntGaugeVec,
}

impl ExitCodeGauge {
    /// Create the gauge described by `desc` and register it on `registry`.
    pub fn new_with_registry(
        registry: &Registry,
        desc: &'static MetricDesc,
    ) -> Result<Self, prometheus::Error> {
        let gauge = IntGaugeVec::new(Opts::new(desc.name, desc.help), desc.labels)?;
        registry.register(Box::new(gauge.clone()))?;
        Ok(Self { gauge })
    }
}

impl ExitCodeSink for ExitCodeGauge {
    fn set_exit_code(&self, task: &str, code: ExitCode) {
        self.gauge.with_label_values(&[task]).set(code);
    }
}

#[cfg(test)]
mod tests {
    use she_model::LABEL_TASK;

    use super::*;

    static EXIT: MetricDesc = MetricDesc::new("test_task_exit_code", "Exit code.", &[LABEL_TASK]);

    #[test]
    fn latest_code_per_task_is_exposed() {
        let registry = Registry::new();
        let gauge = ExitCodeGauge::new_with_registry(&registry, &EXIT).unwrap();

        gauge.set_exit_code("md5", 1);
        gauge.set_exit_code("md5", 0);
        gauge.set_exit_code("diskusage", 2);

        let families = registry.gather();
        let family = families
            .iter()
            .find(|f| f.name() == "test_task_exit_code")
            .expect("gauge not found");
        assert_eq!(family.get_metric().len(), 2);

        let text = prometheus::TextEncoder::new()
            .encode_to_string(&families)
            .unwrap();
        assert!(text.contains("test_task_exit_code{task=\"diskusage\"} 2\n"));
        assert!(text.contains("test_task_exit_code{task=\"md5\"} 0\n"));
    }

    #[test]
    fn same_family_cannot_be_registered_twice() {
        let registry = Registry::new();
        ExitCodeGauge::new_with_registry(&registry, &EXIT).unwrap();
        assert!(ExitCodeGauge::new_with_registry(&registry, &EXIT).is_err());
    }
}
