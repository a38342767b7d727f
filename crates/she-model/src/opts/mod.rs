//! Option structs consumed by the scraper and the task families.
//!
//! All structs deserialize with `#[serde(default)]`, so a config file only needs the fields it overrides.
mod scrape;
pub use scrape::ScrapeOpts;

mod recon;
pub use recon::{ReconOpts, ReconTasks};

mod dispersion;
pub use dispersion::DispersionOpts;
