use std::time::Duration;

use she_model::ScrapeOpts;

/// Runtime settings of the scraper.
#[derive(Clone, Debug)]
pub struct ScrapePolicy {
    /// Consecutive failures tolerated before a task's exit code is reported.
    pub max_failures: u32,
    /// Age after which a read triggers a background refresh.
    pub staleness: Duration,
    /// Period of the scheduled refresh loop; `None` disables it.
    pub interval: Option<Duration>,
}

impl ScrapePolicy {
    /// Build a policy from the `scrape` section of the configuration.
    pub fn from_opts(opts: &ScrapeOpts) -> Self {
        Self {
            max_failures: opts.max_failures,
            staleness: opts.staleness(),
            interval: opts.interval(),
        }
    }

    pub fn new(max_failures: u32, staleness: Duration, interval: Option<Duration>) -> Self {
        Self {
            max_failures,
            staleness,
            interval,
        }
    }
}

impl Default for ScrapePolicy {
    fn default() -> Self {
        Self::from_opts(&ScrapeOpts::default())
    }
}
