use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{format::LogFormat, level::LogLevel, timezone::LogTimeZone};

/// `logger` section of the exporter config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"she_core=debug,info"`.
    pub level: LogLevel,
    /// Timezone of text/JSON timestamps.
    pub tz: LogTimeZone,
    /// Print the module path of each event.
    pub with_targets: bool,
    /// ANSI colors; only honored when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::default(),
            tz: LogTimeZone::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LogConfig {
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: LogConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(cfg.format, LogFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
        assert_eq!(cfg.tz, LogTimeZone::Utc);
        assert!(!cfg.with_targets);
        assert!(cfg.use_color);
    }

    #[test]
    fn partial_section_overrides_given_fields() {
        let cfg: LogConfig =
            serde_json::from_str(r#"{"format": "json", "level": "she_core=debug,warn", "tz": "local"}"#)
                .unwrap();

        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.level.as_str(), "she_core=debug,warn");
        assert_eq!(cfg.tz, LogTimeZone::Local);
        assert!(cfg.use_color);
    }

    #[test]
    fn invalid_level_rejects_the_section() {
        let err = serde_json::from_str::<LogConfig>(r#"{"level": "she_core=loud"}"#);
        assert!(err.is_err());
    }
}
