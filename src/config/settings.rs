//! User settings persisted in config.json

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::BudgetId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol for budgets created from the CLI
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Budget used when a command does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_budget: Option<BudgetId>,

    /// Tracing filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_budget: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist yet
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))
    }

    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// Apply a `key=value` style change from the CLI
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "date_format" => self.date_format = value.to_string(),
            "log_level" => self.log_level = value.to_string(),
            "default_budget" => {
                let id = value.parse().map_err(|_| {
                    LedgerError::Config(format!("Invalid budget ID: {}", value))
                })?;
                self.default_budget = Some(id);
            }
            _ => return Err(LedgerError::Config(format!("Unknown setting: {}", key))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.log_level, "warn");
        assert!(settings.default_budget.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        let budget = BudgetId::new();
        settings.default_budget = Some(budget);
        settings.currency_symbol = "€".into();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_budget, Some(budget));
        assert_eq!(loaded.currency_symbol, "€");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_set_values() {
        let mut settings = Settings::default();
        settings.set("log_level", "debug").unwrap();
        assert_eq!(settings.log_level, "debug");

        assert!(settings.set("default_budget", "nonsense").is_err());
        assert!(settings.set("theme", "dark").is_err());
    }
}
