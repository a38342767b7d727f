use crate::{
    error::{ModelError, ModelResult},
    metric::MetricDesc,
};

/// A single rendered metric value.
///
/// Label values are stored in the order of [`MetricDesc::labels`],
/// which makes the label set an ordered list of unique keys.
/// Samples are immutable: a new collection produces a new set.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    desc: &'static MetricDesc,
    values: Vec<String>,
    value: f64,
}

impl Sample {
    /// Build a sample, checking that one value is supplied per label name.
    pub fn new<I, S>(desc: &'static MetricDesc, values: I, value: f64) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != desc.labels.len() {
            return Err(ModelError::LabelArity {
                metric: desc.name,
                expected: desc.labels.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            desc,
            values,
            value,
        })
    }

    /// Descriptor of the family this sample belongs to.
    #[inline]
    pub fn desc(&self) -> &'static MetricDesc {
        self.desc
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    /// Label values in descriptor order.
    #[inline]
    pub fn label_values(&self) -> &[String] {
        &self.values
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Accumulator used by parsers while turning one report into samples.
///
/// Besides the samples it counts malformed records that were skipped,
/// so a caller can tell "partially parsed" apart from "nothing usable".
#[derive(Debug, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
    skipped: usize,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample; a label arity mismatch counts as a skipped record.
    pub fn push<I, S>(&mut self, desc: &'static MetricDesc, values: I, value: f64)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match Sample::new(desc, values, value) {
            Ok(sample) => self.samples.push(sample),
            Err(_) => self.skipped += 1,
        }
    }

    /// Record a malformed input record that produced no samples.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Number of skipped records.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consume the set, returning the samples and the skipped-record count.
    pub fn into_parts(self) -> (Vec<Sample>, usize) {
        (self.samples, self.skipped)
    }
}
