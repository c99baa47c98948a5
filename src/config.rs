use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_REPORT_WINDOW_DAYS: u64 = 7;
pub const DEFAULT_ACTIVE_HORIZON_DAYS: u64 = 7;
pub const DEFAULT_COMPARE_PERIOD_DAYS: u64 = 7;
/// Upper bound for every day-valued setting.
pub const MAX_CONFIG_DAYS: u64 = 365;

/// Policy constants of the engine. Every field has a default, so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Trailing window, in days, behind ChatCount, AvgPromptsPerChat and
    /// OmniboxOpens.
    pub report_window_days: u64,
    /// Days a metric keeps re-emitting after its last qualifying event.
    pub active_horizon_days: u64,
    /// Length of the periods compared by OmniboxWeekCompare.
    pub compare_period_days: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            report_window_days: DEFAULT_REPORT_WINDOW_DAYS,
            active_horizon_days: DEFAULT_ACTIVE_HORIZON_DAYS,
            compare_period_days: DEFAULT_COMPARE_PERIOD_DAYS,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("report_window_days", self.report_window_days),
            ("active_horizon_days", self.active_horizon_days),
            ("compare_period_days", self.compare_period_days),
        ];
        for (name, days) in fields {
            if !(1..=MAX_CONFIG_DAYS).contains(&days) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_CONFIG_DAYS, days
                )));
            }
        }
        Ok(())
    }

    /// Retention of the omnibox counters: two adjacent closed periods plus
    /// the current day, and never less than the report window.
    pub fn omnibox_retention_days(&self) -> u64 {
        self.compare_period_days
            .saturating_mul(2)
            .saturating_add(1)
            .max(self.report_window_days)
    }
}
