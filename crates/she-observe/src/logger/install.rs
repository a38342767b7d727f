use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LogConfig,
    error::{LoggerError, LoggerResult},
    timezone::Rfc3339Timer,
};

pub(crate) fn text(cfg: &LogConfig) -> LoggerResult<()> {
    let layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(Rfc3339Timer::new(cfg.tz));

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()?).with(layer))
}

pub(crate) fn json(cfg: &LogConfig) -> LoggerResult<()> {
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_current_span(true)
        .with_timer(Rfc3339Timer::new(cfg.tz));

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()?).with(layer))
}

/// journald stamps records itself, so no timer is configured.
#[cfg(target_os = "linux")]
pub(crate) fn journald(cfg: &LogConfig) -> LoggerResult<()> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?
        .with_syslog_identifier("swift-health-exporter".to_string());

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()?).with(layer))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn journald(_cfg: &LogConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}
