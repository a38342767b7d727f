//! Bounded execution of external health-check commands.
//!
//! [`run_with_timeout`] spawns a process, captures its stdout and stderr as one
//! combined byte stream and kills it once the timeout expires.
//! There is no retry at this layer: retry and threshold policy belong to the scraper.
mod error;
pub use error::ExecError;

mod command;
pub use command::{CommandSpec, run_with_timeout};
