//! Scraping engine of the exporter.
//!
//! - [`Task`] is the pluggable unit: one external health check plus its parser.
//! - [`Scraper`] owns the task registry, runs refreshes (scheduled, explicit, or triggered
//!   by a stale read), caches the latest [`TaskResult`] per task and applies the
//!   consecutive-failure threshold before reporting a task as failed.
//! - [`ExitCodeSink`] receives the exit code to report after each refresh.
pub mod error;
pub mod exit_code;
pub mod policy;
pub mod scraper;
pub mod task;

pub use error::{CoreError, TaskError};
pub use exit_code::{ExitCodeHandle, ExitCodeSink, NoOpExitCode, noop_exit_code};
pub use policy::ScrapePolicy;
pub use scraper::{Scraper, TaskResult};
pub use task::{Report, Task, TaskRef};

pub mod prelude {
    pub use crate::error::{CoreError, TaskError};
    pub use crate::exit_code::{ExitCodeHandle, ExitCodeSink};
    pub use crate::policy::ScrapePolicy;
    pub use crate::scraper::Scraper;
    pub use crate::task::{Report, Task, TaskRef};
}
