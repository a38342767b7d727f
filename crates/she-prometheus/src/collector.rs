use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use prometheus::{
    GaugeVec, Opts,
    core::{Collector, Desc},
    proto::MetricFamily,
};
use she_core::Scraper;
use she_model::{MetricDesc, Sample};
use tracing::{trace, warn};

/// Exposes the scraper's cached samples as gauge families.
///
/// Never waits for a refresh: a gather renders whatever is cached and only schedules
/// background refreshes for stale tasks.
pub struct TaskCollector {
    scraper: Arc<Scraper>,
    descs: Vec<Desc>,
}

impl TaskCollector {
    /// Describe every family declared by the registered tasks.
    pub fn new(scraper: Arc<Scraper>) -> Result<Self, prometheus::Error> {
        let mut seen = HashSet::new();
        let mut descs = Vec::new();
        for desc in scraper.tasks().flat_map(|t| t.describe().iter().copied()) {
            if !seen.insert(desc.name) {
                continue;
            }
            descs.push(Desc::new(
                desc.name.to_string(),
                desc.help.to_string(),
                desc.labels.iter().map(|l| l.to_string()).collect(),
                HashMap::new(),
            )?);
        }
        Ok(Self { scraper, descs })
    }
}

impl Collector for TaskCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.scraper.trigger_stale();

        let snapshots = self.scraper.snapshots();
        let mut families: BTreeMap<&'static str, (&'static MetricDesc, Vec<&Sample>)> =
            BTreeMap::new();
        for (_, result) in &snapshots {
            for sample in result.samples() {
                families
                    .entry(sample.name())
                    .or_insert_with(|| (sample.desc(), Vec::new()))
                    .1
                    .push(sample);
            }
        }

        let mut out = Vec::with_capacity(families.len());
        for (name, (desc, samples)) in families {
            let vec = match GaugeVec::new(Opts::new(desc.name, desc.help), desc.labels) {
                Ok(vec) => vec,
                Err(e) => {
                    warn!(metric = name, error = %e, "cannot render metric family");
                    continue;
                }
            };
            for sample in samples {
                let values: Vec<&str> = sample.label_values().iter().map(String::as_str).collect();
                match vec.get_metric_with_label_values(&values) {
                    Ok(gauge) => gauge.set(sample.value()),
                    Err(e) => warn!(metric = name, error = %e, "skipping sample"),
                }
            }
            out.extend(vec.collect());
        }
        trace!(families = out.len(), "task metrics collected");
        out
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use prometheus::{Registry, TextEncoder};
    use she_core::{Report, ScrapePolicy, Task, TaskError, noop_exit_code};
    use she_model::SampleSet;

    use super::*;

    static VALUE: MetricDesc = MetricDesc::new("test_value", "Test value.", &["storage_ip"]);
    static TOTAL: MetricDesc = MetricDesc::new("test_total", "Test total.", &[]);
    static BROKEN: MetricDesc = MetricDesc::new("test_broken", "Never rendered.", &[]);

    static HEALTHY_DESCS: [&MetricDesc; 2] = [&VALUE, &TOTAL];
    static BROKEN_DESCS: [&MetricDesc; 2] = [&BROKEN, &TOTAL];

    struct Healthy;

    #[async_trait]
    impl Task for Healthy {
        fn name(&self) -> &str {
            "healthy"
        }

        fn describe(&self) -> &'static [&'static MetricDesc] {
            &HEALTHY_DESCS
        }

        async fn collect(&self) -> Result<Report, TaskError> {
            let mut set = SampleSet::new();
            set.push(&VALUE, ["10.0.0.2"], 2.0);
            set.push(&VALUE, ["10.0.0.1"], 1.5);
            set.push(&TOTAL, [""; 0], 3.0);
            Ok(Report::new(set))
        }
    }

    struct Broken;

    #[async_trait]
    impl Task for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn describe(&self) -> &'static [&'static MetricDesc] {
            &BROKEN_DESCS
        }

        async fn collect(&self) -> Result<Report, TaskError> {
            Err(TaskError::Parse("garbage".into()))
        }
    }

    fn scraper() -> Arc<Scraper> {
        let mut scraper = Scraper::new(ScrapePolicy::default());
        scraper.add_task(Arc::new(Healthy), noop_exit_code()).unwrap();
        scraper.add_task(Arc::new(Broken), noop_exit_code()).unwrap();
        Arc::new(scraper)
    }

    #[test]
    fn shared_families_are_described_once() {
        let collector = TaskCollector::new(scraper()).unwrap();
        let names: Vec<&str> = collector.desc().iter().map(|d| d.fq_name.as_str()).collect();
        assert_eq!(names, ["test_value", "test_total", "test_broken"]);
    }

    #[test]
    fn nothing_is_rendered_before_first_refresh() {
        let collector = TaskCollector::new(scraper()).unwrap();
        assert!(collector.collect().is_empty());
    }

    #[tokio::test]
    async fn cached_samples_are_rendered_sorted() {
        let scraper = scraper();
        let registry = Registry::new();
        registry
            .register(Box::new(TaskCollector::new(scraper.clone()).unwrap()))
            .unwrap();

        scraper.update_all_metrics().await;

        let text = TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap();
        assert_eq!(
            text,
            "# HELP test_total Test total.\n\
             # TYPE test_total gauge\n\
             test_total 3\n\
             # HELP test_value Test value.\n\
             # TYPE test_value gauge\n\
             test_value{storage_ip=\"10.0.0.1\"} 1.5\n\
             test_value{storage_ip=\"10.0.0.2\"} 2\n"
        );
    }
}
