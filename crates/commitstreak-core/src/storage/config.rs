//! TOML-based application configuration.
//!
//! Stores:
//! - the calendar bounds (simulation epoch and hard stop date)
//! - the activity parameters of the streaky preset
//! - which preset to run
//! - repository settings (state file name, whether to push)
//!
//! Configuration is stored at `~/.config/commitstreak/config.toml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::activity::{
    ActivityRules, Preset, DEFAULT_STREAK_MAX_DAYS, DEFAULT_STREAK_MIN_DAYS,
    DEFAULT_STREAK_START_ODDS, DEFAULT_UNITS_MAX, DEFAULT_UNITS_MIN,
};
use crate::error::{ConfigError, ValidationError};
use crate::state::DEFAULT_STATE_FILE;

/// Calendar bounds of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First simulated day and parity reference
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
    /// Last day that may ever receive commits
    #[serde(default = "default_hard_stop")]
    pub hard_stop: NaiveDate,
}

/// Parameters used by the streaky preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_streak_start_odds")]
    pub streak_start_odds: u32,
    #[serde(default = "default_streak_min_days")]
    pub streak_min_days: u32,
    #[serde(default = "default_streak_max_days")]
    pub streak_max_days: u32,
    #[serde(default = "default_units_min")]
    pub units_min: u32,
    #[serde(default = "default_units_max")]
    pub units_max: u32,
}

/// Repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// State file, relative to the repository working tree.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_true")]
    pub push: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/commitstreak/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preset: Preset,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub repo: RepoConfig,
}

// Default functions
fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}
fn default_hard_stop() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 31).unwrap_or(NaiveDate::MAX)
}
fn default_streak_start_odds() -> u32 {
    DEFAULT_STREAK_START_ODDS
}
fn default_streak_min_days() -> u32 {
    DEFAULT_STREAK_MIN_DAYS
}
fn default_streak_max_days() -> u32 {
    DEFAULT_STREAK_MAX_DAYS
}
fn default_units_min() -> u32 {
    DEFAULT_UNITS_MIN
}
fn default_units_max() -> u32 {
    DEFAULT_UNITS_MAX
}
fn default_state_file() -> String {
    DEFAULT_STATE_FILE.into()
}
fn default_true() -> bool {
    true
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            hard_stop: default_hard_stop(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            streak_start_odds: DEFAULT_STREAK_START_ODDS,
            streak_min_days: DEFAULT_STREAK_MIN_DAYS,
            streak_max_days: DEFAULT_STREAK_MAX_DAYS,
            units_min: DEFAULT_UNITS_MIN,
            units_max: DEFAULT_UNITS_MAX,
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            push: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preset: Preset::Streaky,
            calendar: CalendarConfig::default(),
            activity: ActivityConfig::default(),
            repo: RepoConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot assign a whole section".to_string()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/commitstreak"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults there when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, keeping the existing value's type.
    ///
    /// Does not persist; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// The engine parameters this configuration resolves to.
    pub fn rules(&self) -> ActivityRules {
        let epoch = self.calendar.epoch;
        match self.preset {
            Preset::Streaky => ActivityRules {
                epoch,
                streak_start_odds: self.activity.streak_start_odds,
                streak_min_days: self.activity.streak_min_days,
                streak_max_days: self.activity.streak_max_days,
                units_min: self.activity.units_min,
                units_max: self.activity.units_max,
            },
            Preset::Fixed => ActivityRules::fixed(epoch),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the hard stop precedes the epoch or an activity range is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.calendar.hard_stop < self.calendar.epoch {
            return Err(ValidationError::HardStopBeforeEpoch {
                epoch: self.calendar.epoch,
                hard_stop: self.calendar.hard_stop,
            });
        }
        self.rules().validate()
    }
}
