use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::error::LoggerError;

/// Validated `EnvFilter` expression.
///
/// The raw string is kept so the config serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogLevel(String);

impl LogLevel {
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter for the subscriber.
    pub fn to_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.0).map_err(|e| LoggerError::InvalidLevel(format!("{}: {e}", self.0)))
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LogLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let level = LogLevel(s);
        level.to_env_filter()?;
        Ok(level)
    }
}

impl From<LogLevel> for String {
    fn from(l: LogLevel) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_targeted_filters() {
        for expr in ["info", "trace", "she_core=debug,info", "she_exec=trace,she_swift=debug,warn"] {
            assert!(expr.parse::<LogLevel>().is_ok(), "{expr} should parse");
        }
    }

    #[test]
    fn rejects_unknown_levels() {
        for expr in ["she_core=loud", "she_exec=verbose,info"] {
            assert!(matches!(
                LogLevel::new(expr),
                Err(LoggerError::InvalidLevel(_))
            ));
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let level: LogLevel = serde_json::from_str(r#""she_swift=debug,info""#).unwrap();
        assert_eq!(level.as_str(), "she_swift=debug,info");
        assert_eq!(
            serde_json::to_string(&level).unwrap(),
            r#""she_swift=debug,info""#
        );
    }

    #[test]
    fn default_builds_a_filter() {
        assert!(LogLevel::default().to_env_filter().is_ok());
    }
}
