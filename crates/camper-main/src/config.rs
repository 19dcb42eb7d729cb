// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CamperDash.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use camper_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use camper_core::series::DEFAULT_BUCKET_HOURS;
use camper_core::views::DEFAULT_HISTORY_LIMIT;
use camper_core::{DisplayThresholds, HistorySettings};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "camper.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Telemetry API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Refresh intervals per view
    #[serde(default)]
    pub polling: PollingConfig,

    /// History chart settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Thresholds for colored readouts
    #[serde(default)]
    pub display: DisplayThresholds,

    #[serde(default)]
    pub system: SystemConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound on every HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per request on transport errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub status_interval_secs: u64,

    #[serde(default = "default_interval_secs")]
    pub history_interval_secs: u64,

    #[serde(default = "default_interval_secs")]
    pub messages_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Samples requested per chart
    #[serde(default = "default_history_limit")]
    pub limit: usize,

    /// Resampling bucket for numeric series
    #[serde(default = "default_bucket_hours")]
    pub bucket_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_interval_secs() -> u64 {
    5
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_bucket_hours() -> i64 {
    DEFAULT_BUCKET_HOURS
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: default_interval_secs(),
            history_interval_secs: default_interval_secs(),
            messages_interval_secs: default_interval_secs(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
            bucket_hours: default_bucket_hours(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("defaults"),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Reads `path` if given (it must exist), else `camper.toml` if present,
    /// else defaults. Environment overrides are applied last, then the result
    /// is validated.
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        let (mut config, origin) = match path {
            Some(path) => (Self::from_file(path)?, ConfigOrigin::File(path.to_owned())),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    (
                        Self::from_file(default_path)?,
                        ConfigOrigin::File(default_path.to_owned()),
                    )
                } else {
                    (Self::default(), ConfigOrigin::Defaults)
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, origin))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Invalid configuration")
    }

    /// Apply `CAMPER_*` overrides; `lookup` reads one variable
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CAMPER_API_BASE") {
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("CAMPER_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse::<u64>()
        {
            self.api.timeout_secs = secs;
        }

        if let Some(interval) = lookup("CAMPER_POLL_INTERVAL_SECS")
            && let Ok(secs) = interval.parse::<u64>()
        {
            self.polling.status_interval_secs = secs;
            self.polling.history_interval_secs = secs;
            self.polling.messages_interval_secs = secs;
        }

        if let Some(level) = lookup("CAMPER_LOG_LEVEL") {
            self.system.log_level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            anyhow::bail!("api.base_url cannot be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("api.base_url must start with http:// or https://, got '{url}'");
        }
        if !(1..=60).contains(&self.api.timeout_secs) {
            anyhow::bail!("api.timeout_secs must be between 1 and 60 seconds");
        }
        if self.api.max_retries == 0 {
            anyhow::bail!("api.max_retries must be at least 1");
        }

        for (name, secs) in [
            ("status_interval_secs", self.polling.status_interval_secs),
            ("history_interval_secs", self.polling.history_interval_secs),
            ("messages_interval_secs", self.polling.messages_interval_secs),
        ] {
            if secs == 0 {
                anyhow::bail!("polling.{name} must be at least 1 second");
            }
        }

        if self.history.limit == 0 {
            anyhow::bail!("history.limit must be at least 1");
        }
        if self.history.bucket_hours < 1 {
            anyhow::bail!("history.bucket_hours must be at least 1");
        }

        let thresholds = [
            self.display.battery_ok_volts,
            self.display.mains_present_volts,
        ];
        if !thresholds.iter().all(|v| v.is_finite()) {
            anyhow::bail!("display thresholds must be finite numbers");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.api.retry_delay_ms)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.polling.status_interval_secs)
    }

    pub fn messages_interval(&self) -> Duration {
        Duration::from_secs(self.polling.messages_interval_secs)
    }

    pub fn history_settings(&self) -> HistorySettings {
        HistorySettings {
            limit: self.history.limit,
            bucket: TimeDelta::hours(self.history.bucket_hours),
            interval: Duration::from_secs(self.polling.history_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.api.max_retries, 1);
        assert_eq!(config.history.limit, 10_000);
        assert_eq!(config.history.bucket_hours, 4);
        assert_eq!(config.status_interval(), Duration::from_secs(5));
        assert_eq!(config.display.battery_ok_volts, 12.0);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [api]
            base_url = "http://camper.local:8000"

            [display]
            battery_ok_volts = 12.2
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://camper.local:8000");
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.display.battery_ok_volts, 12.2);
        assert_eq!(config.display.mains_present_volts, 7.0);
        assert_eq!(config.system.log_level, "info");
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let example = include_str!("../../../camper.example.toml");
        let config = AppConfig::from_toml_str(example).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[polling]\nstatus_interval_secs = 2\n\n[history]\nlimit = 500\nbucket_hours = 1"
        )
        .unwrap();

        let (config, origin) = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(origin, ConfigOrigin::File(file.path().to_owned()));
        assert_eq!(config.polling.status_interval_secs, 2);
        let settings = config.history_settings();
        assert_eq!(settings.limit, 500);
        assert_eq!(settings.bucket, TimeDelta::hours(1));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("CAMPER_API_BASE", "http://10.0.0.2:8000"),
            ("CAMPER_TIMEOUT_SECS", "7"),
            ("CAMPER_POLL_INTERVAL_SECS", "10"),
            ("CAMPER_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.api.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.api.timeout_secs, 7);
        assert_eq!(config.polling.history_interval_secs, 10);
        assert_eq!(config.system.log_level, "debug");
    }

    #[test]
    fn test_unparseable_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("CAMPER_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.api.timeout_secs, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.api.base_url = "localhost:8000".to_owned();
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("http://")
        );

        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.polling.messages_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.history.bucket_hours = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.display.mains_present_volts = f64::NAN;
        assert!(config.validate().is_err());
    }
}
