//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveTime, Timelike};
use dose_core::ScheduleConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Horizon length used when `--days` is not given.
    pub default_days: i64,

    /// Minimum spacing between doses of one exclusion group, in minutes.
    pub overlap_window_minutes: u32,

    /// Local time of each day's first dose, as `HH:MM`.
    pub daily_anchor: String,
}

impl Default for Config {
    fn default() -> Self {
        let schedule = ScheduleConfig::default();
        Self {
            default_days: 7,
            overlap_window_minutes: schedule.overlap_window_minutes,
            daily_anchor: format!(
                "{:02}:{:02}",
                schedule.daily_anchor_minutes / 60,
                schedule.daily_anchor_minutes % 60
            ),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (DOSESCHED_*)
        figment = figment.merge(Env::prefixed("DOSESCHED_"));

        figment.extract()
    }

    /// Scheduler settings derived from this configuration.
    pub fn schedule_config(&self) -> Result<ScheduleConfig> {
        let anchor = NaiveTime::parse_from_str(&self.daily_anchor, "%H:%M").with_context(|| {
            format!("invalid daily_anchor {:?}, expected HH:MM", self.daily_anchor)
        })?;
        Ok(ScheduleConfig {
            overlap_window_minutes: self.overlap_window_minutes,
            daily_anchor_minutes: anchor.num_seconds_from_midnight() / 60,
        })
    }
}

/// Returns the platform-specific config directory for dosesched.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dosesched"))
}
