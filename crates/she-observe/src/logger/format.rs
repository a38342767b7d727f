use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::logger::error::LoggerError;

/// Where and how events are written.
/// - `Text`: human-readable lines on stdout;
/// - `Json`: one JSON object per event on stdout;
/// - `Journald`: native systemd-journald records (Linux only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    Journald,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "journald" | "journal" if cfg!(target_os = "linux") => Ok(Self::Journald),
            "journald" | "journal" => Err(LoggerError::JournaldNotSupported),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Journald => "journald",
        })
    }
}

impl Serialize for LogFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!(" Json ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "logfmt".parse::<LogFormat>(),
            Err(LoggerError::InvalidFormat(_))
        ));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn journal_alias_is_accepted_on_linux() {
        assert_eq!("journal".parse::<LogFormat>().unwrap(), LogFormat::Journald);
        let parsed: LogFormat = serde_json::from_str(r#""journald""#).unwrap();
        assert_eq!(parsed.to_string(), "journald");
    }

    #[test]
    fn serializes_canonical_name() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), r#""json""#);
    }
}
