use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::error::LoggerError;

/// Timezone of log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogTimeZone {
    #[default]
    Utc,
    /// System timezone, detected once when the logger is installed.
    Local,
}

impl LogTimeZone {
    /// Resolve to a fixed offset; local detection falls back to UTC.
    pub fn offset(self) -> UtcOffset {
        match self {
            LogTimeZone::Utc => UtcOffset::UTC,
            LogTimeZone::Local => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }
}

impl FromStr for LogTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LogTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogTimeZone::Utc => "utc",
            LogTimeZone::Local => "local",
        })
    }
}

impl Serialize for LogTimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogTimeZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// RFC3339 timestamps at a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct Rfc3339Timer {
    offset: UtcOffset,
}

impl Rfc3339Timer {
    pub fn new(tz: LogTimeZone) -> Self {
        Self { offset: tz.offset() }
    }

    fn now(&self) -> Option<String> {
        OffsetDateTime::now_utc()
            .to_offset(self.offset)
            .format(&Rfc3339)
            .ok()
    }
}

impl FormatTime for Rfc3339Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.now() {
            Some(ts) => write!(w, "{ts}"),
            None => write!(w, "<invalid-time>"),
        }
    }
}
