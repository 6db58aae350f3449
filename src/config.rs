//! Runtime configuration
//!
//! Layered in this order, later layers winning:
//! - Built-in defaults
//! - Config file (optional)
//! - Environment variables
//!
//! The result is validated once at startup and handed to the components that need it.
//! The API token is deliberately not part of the file format; it only comes from
//! `PAGERDUTY_API_TOKEN`.

use crate::classify::HourRules;
use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "PAGERDUTY_API_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub query: QueryConfig,
    pub hours: HoursConfig,
    pub output: OutputConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_limit: u32,
    pub timeout_secs: u64,
    pub urgencies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Empty means every team on the account.
    pub team_ids: Vec<String>,
    /// Log-entry actors that are never charged, e.g. a bot user.
    pub ignored_user_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoursConfig {
    pub sleep_start: u32,
    pub sleep_end: u32,
    pub business_start: u32,
    pub business_end: u32,
    pub fallback_time_zone: String,
    pub slo_max_sleep_interruptions_per_week: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub description_width: usize,
    pub timestamp_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            api: ApiConfig::default(),
            query: QueryConfig::default(),
            hours: HoursConfig::default(),
            output: OutputConfig::default(),
            source: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "ERROR".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pagerduty.com".to_string(),
            page_limit: 100,
            timeout_secs: 30,
            urgencies: vec!["high".to_string()],
        }
    }
}

impl Default for HoursConfig {
    fn default() -> Self {
        let rules = HourRules::default();
        Self {
            sleep_start: rules.sleep_start,
            sleep_end: rules.sleep_end,
            business_start: rules.business_start,
            business_end: rules.business_end,
            fallback_time_zone: "America/Denver".to_string(),
            slo_max_sleep_interruptions_per_week: 1,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("report.csv"),
            description_width: 50,
            timestamp_format: "%Y-%m-%d %H:%M:%S %:z".to_string(),
        }
    }
}

impl HoursConfig {
    pub fn rules(&self) -> HourRules {
        HourRules {
            sleep_start: self.sleep_start,
            sleep_end: self.sleep_end,
            business_start: self.business_start,
            business_end: self.business_end,
        }
    }

    pub fn fallback_zone(&self) -> Result<Tz> {
        self.fallback_time_zone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown fallback time zone: {}", self.fallback_time_zone))
    }
}

impl Config {
    /// Load configuration from an explicit file, or the first default location found,
    /// then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_default_file(),
        };
        let mut config = match &source {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };
        config.source = source;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn find_default_file() -> Option<PathBuf> {
        let mut config_paths = vec![
            PathBuf::from("pager-interrupts.toml"),
            PathBuf::from(".pager-interrupts.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            config_paths.push(dir.join("pager-interrupts").join("config.toml"));
        }

        config_paths.into_iter().find(|path| path.is_file())
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }
        if let Ok(val) = env::var("PAGER_INTERRUPTS_LOG_DIR") {
            self.logging.directory = PathBuf::from(val);
        }

        if let Ok(val) = env::var("PAGERDUTY_API_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = env::var("PAGER_INTERRUPTS_PAGE_LIMIT") {
            self.api.page_limit = val
                .parse()
                .context("Invalid PAGER_INTERRUPTS_PAGE_LIMIT")?;
        }

        if let Ok(val) = env::var("PAGER_INTERRUPTS_TEAM_IDS") {
            self.query.team_ids = split_ids(&val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.page_limit == 0 || self.api.page_limit > 100 {
            return Err(anyhow::anyhow!(
                "Page limit must be between 1 and 100, got {}",
                self.api.page_limit
            ));
        }

        if self.api.urgencies.is_empty() {
            return Err(anyhow::anyhow!("At least one urgency must be queried"));
        }

        let hours = &self.hours;
        for (name, value) in [
            ("sleep_start", hours.sleep_start),
            ("sleep_end", hours.sleep_end),
            ("business_start", hours.business_start),
            ("business_end", hours.business_end),
        ] {
            if value > 23 {
                return Err(anyhow::anyhow!("hours.{} must be 0-23, got {}", name, value));
            }
        }

        if hours.sleep_start == hours.sleep_end {
            return Err(anyhow::anyhow!(
                "Sleep hours must not start and end at the same hour ({})",
                hours.sleep_start
            ));
        }

        if hours.business_start >= hours.business_end {
            return Err(anyhow::anyhow!(
                "Business hours must start before they end ({} >= {})",
                hours.business_start,
                hours.business_end
            ));
        }

        hours.fallback_zone()?;

        if self.output.description_width == 0 {
            return Err(anyhow::anyhow!("Description width must be greater than 0"));
        }

        let format = &self.output.timestamp_format;
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(anyhow::anyhow!("Unsupported timestamp format: {}", format));
        }

        Ok(())
    }
}

/// Split a comma-separated id list, dropping blanks.
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
