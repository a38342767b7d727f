use serde::{Deserialize, Serialize};

/// On/off switch used by option structs to enable a task family or a single check.
///
/// Serialized as a plain JSON boolean. Defaults to enabled so that an omitted
/// field in a config file keeps the check running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(bool);

impl Flag {
    /// Create an enabled flag.
    pub const fn enabled() -> Self {
        Self(true)
    }

    /// Create a disabled flag.
    pub const fn disabled() -> Self {
        Self(false)
    }

    /// Check if the flag is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.0
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::enabled()
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn omitted_flag_means_enabled() {
        assert!(Flag::default().is_enabled());
        assert!(!Flag::disabled().is_enabled());
    }

    #[test]
    fn reads_plain_json_booleans() {
        let on: Flag = serde_json::from_str("true").unwrap();
        let off: Flag = serde_json::from_str("false").unwrap();

        assert_eq!(on, Flag::enabled());
        assert_eq!(off, Flag::from(false));
        assert_eq!(serde_json::to_string(&off).unwrap(), "false");
    }
}
