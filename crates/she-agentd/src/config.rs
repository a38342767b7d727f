use std::{
    env, fs,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use she_model::{DispersionOpts, ReconOpts, ScrapeOpts};
use she_observe::LogConfig;

/// Environment variable naming the config file when no CLI argument is given.
pub const CONFIG_ENV: &str = "SHE_CONFIG";

/// Exporter config file. Every section and field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Address the HTTP endpoint binds to.
    pub listen: SocketAddr,
    pub logger: LogConfig,
    pub scrape: ScrapeOpts,
    pub recon: ReconOpts,
    pub dispersion: DispersionOpts,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9520)),
            logger: LogConfig::default(),
            scrape: ScrapeOpts::default(),
            recon: ReconOpts::default(),
            dispersion: DispersionOpts::default(),
        }
    }
}

impl ExporterConfig {
    /// Load from the first CLI argument, else from `$SHE_CONFIG`, else use defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = env::args_os()
            .nth(1)
            .or_else(|| env::var_os(CONFIG_ENV))
            .map(PathBuf::from);
        match path {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Check the sections of every enabled task family.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.recon.enabled.is_enabled() {
            self.recon.validate()?;
        }
        if self.dispersion.enabled.is_enabled() {
            self.dispersion.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use she_observe::LogFormat;

    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let cfg = ExporterConfig::parse("{}").unwrap();

        assert_eq!(cfg.listen.to_string(), "0.0.0.0:9520");
        assert_eq!(cfg.scrape.max_failures, 4);
        assert_eq!(cfg.recon.path_to_executable, PathBuf::from("swift-recon"));
        assert_eq!(cfg.dispersion.timeout(), Duration::from_secs(20));
        assert_eq!(cfg.logger.format, LogFormat::Text);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = ExporterConfig::parse(
            r#"{
                "listen": "127.0.0.1:9000",
                "logger": {"format": "json", "level": "she_core=debug,info"},
                "scrape": {"max_failures": 2, "interval_ms": 0},
                "recon": {"path_to_executable": "/usr/bin/swift-recon", "tasks": {"md5": false}},
                "dispersion": {"enabled": false}
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.listen.port(), 9000);
        assert_eq!(cfg.logger.format, LogFormat::Json);
        assert_eq!(cfg.scrape.max_failures, 2);
        assert!(cfg.scrape.interval().is_none());
        assert!(!cfg.recon.tasks.md5.is_enabled());
        assert!(cfg.recon.tasks.disk_usage.is_enabled());
        assert!(!cfg.dispersion.enabled.is_enabled());
    }

    #[test]
    fn disabled_family_is_not_validated() {
        let mut cfg = ExporterConfig::default();
        cfg.dispersion.timeout_ms = 0;
        assert!(cfg.validate().is_err());

        cfg.dispersion.enabled = false.into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(ExporterConfig::parse(r#"{"listen": "not an address"}"#).is_err());
        assert!(ExporterConfig::parse(r#"{"logger": {"format": "xml"}}"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ExporterConfig::load(Path::new("/nonexistent/she.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/she.json"));
    }
}
