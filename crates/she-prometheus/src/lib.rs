//! Prometheus exposition of scraped task results.
//!
//! - [`TaskCollector`] implements [`prometheus::core::Collector`] over a
//!   [`she_core::Scraper`]: every gather serves the cached samples and kicks off background
//!   refreshes for stale tasks.
//! - [`ExitCodeGauge`] is the exit-code sink, one `IntGaugeVec` per task family.
//!
//! ## Example
//! ```rust,ignore
//! let registry = Registry::new();
//! let recon_exit = Arc::new(ExitCodeGauge::new_with_registry(&registry, &recon::EXIT_CODE)?);
//!
//! let mut scraper = Scraper::new(ScrapePolicy::default());
//! for task in recon::recon_tasks(&opts) {
//!     scraper.add_task(task, recon_exit.clone())?;
//! }
//! let scraper = Arc::new(scraper);
//! registry.register(Box::new(TaskCollector::new(scraper.clone())?))?;
//!
//! let body = TextEncoder::new().encode_to_string(&registry.gather())?;
//! ```
//!
//! Families are rendered as gauges. Sample ordering is the registry's: families by name,
//! series by label values.

mod collector;
pub use collector::TaskCollector;

mod exit_code;
pub use exit_code::ExitCodeGauge;

pub use prometheus::{Encoder, Registry, TextEncoder};
