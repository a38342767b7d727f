//! Logging setup for the exporter.
//!
//! Configuration is plain serde data ([`LogConfig`]) so it can live in the exporter's
//! config file; [`init_logger`] turns it into a global `tracing` subscriber.
mod logger;
pub use logger::*;
