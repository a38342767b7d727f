mod domain;
pub use domain::{EXIT_CODE_FAILED, EXIT_CODE_OK, LABEL_STORAGE_IP, LABEL_TASK};
pub use domain::{ExitCode, Flag, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod metric;
pub use metric::{MetricDesc, Sample, SampleSet};

mod opts;
pub use opts::{DispersionOpts, ReconOpts, ReconTasks, ScrapeOpts};
