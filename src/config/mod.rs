//! YAML configuration.
//!
//! A single optional config file covers the HTTP server, the database
//! location, scheduler tick interval, the GPIO pin, and the default season
//! boundary dates that seed the database on first boot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::season::{SeasonDates, SeasonTable};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, created on first boot.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("poolfilter.db"),
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Polling interval of the background loop, in seconds.
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1,
        }
    }
}

/// Hardware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// BCM pin number driving the pump relay (only used with the `gpio`
    /// feature).
    pub gpio_pin: u8,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self { gpio_pin: 14 }
    }
}

/// Season boundary dates in `MM-DD` form, as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDatesConfig {
    pub start: String,
    pub peak: String,
}

/// Default season dates seeded into the database on first boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonsConfig {
    pub summer: SeasonDatesConfig,
    pub winter: SeasonDatesConfig,
}

impl Default for SeasonsConfig {
    fn default() -> Self {
        Self {
            summer: SeasonDatesConfig {
                start: "05-01".to_string(),
                peak: "07-15".to_string(),
            },
            winter: SeasonDatesConfig {
                start: "11-01".to_string(),
                peak: "01-15".to_string(),
            },
        }
    }
}

fn parse_month_day(s: &str) -> Result<(u32, u32), ConfigError> {
    let (month, day) = s
        .split_once('-')
        .ok_or_else(|| ConfigError::Invalid(format!("expected MM-DD, got '{s}'")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("bad month in '{s}'")))?;
    let day: u32 = day
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("bad day in '{s}'")))?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(ConfigError::Invalid(format!("out-of-range date '{s}'")));
    }
    Ok((month, day))
}

impl SeasonsConfig {
    /// Convert the config strings into the domain season table.
    pub fn to_table(&self) -> Result<SeasonTable, ConfigError> {
        Ok(SeasonTable {
            summer: SeasonDates {
                start: parse_month_day(&self.summer.start)?,
                peak: parse_month_day(&self.summer.peak)?,
            },
            winter: SeasonDates {
                start: parse_month_day(&self.winter.start)?,
                peak: parse_month_day(&self.winter.peak)?,
            },
        })
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub hardware: HardwareConfig,
    pub seasons: SeasonsConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// The scheduler tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.tick_interval_secs.max(1))
    }
}
