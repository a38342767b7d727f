mod desc;
pub use desc::MetricDesc;

mod sample;
pub use sample::{Sample, SampleSet};
