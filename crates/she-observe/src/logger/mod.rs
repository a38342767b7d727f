mod config;
mod error;
mod format;
mod install;
mod level;
mod timezone;

pub use config::LogConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LogFormat;
pub use level::LogLevel;
pub use timezone::{LogTimeZone, Rfc3339Timer};

/// Install the global tracing subscriber described by `cfg`.
///
/// With [`LogTimeZone::Local`] the offset is detected here, once; call this before the tokio
/// runtime starts its worker threads, otherwise detection fails and UTC is used.
///
/// # Examples
/// ```rust
/// use she_observe::{LogConfig, init_logger};
///
/// init_logger(&LogConfig::default()).expect("logger");
/// tracing::info!("exporter starting");
/// ```
pub fn init_logger(cfg: &LogConfig) -> LoggerResult<()> {
    match cfg.format {
        LogFormat::Text => install::text(cfg),
        LogFormat::Json => install::json(cfg),
        LogFormat::Journald => install::journald(cfg),
    }
}
