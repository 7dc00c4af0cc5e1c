//! Configuration structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl AppConfig {
    /// Check cross-field constraints the deserializer cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SettingsError::Invalid(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }

        if self.provider.kind == ProviderKind::Csv && self.provider.csv_dir.is_none() {
            return Err(SettingsError::Invalid(
                "provider.csv_dir is required when provider.kind = \"csv\"".to_string(),
            ));
        }

        if self.cache.snapshot_path.as_os_str().is_empty() {
            return Err(SettingsError::Invalid(
                "cache.snapshot_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML, e.g. to write out a starting config file.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Invalid(e.to_string()))
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "pricecache".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Cache storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Snapshot file holding every cached series.
    pub snapshot_path: PathBuf,
    /// First day fetched for a symbol with no history.
    pub start_date: NaiveDate,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data_store.json"),
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        }
    }
}

/// Which price provider backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

/// Price provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderSettings {
    #[serde(default)]
    pub kind: ProviderKind,
    /// Directory of `{SYMBOL}.csv` files for the CSV provider.
    #[serde(default)]
    pub csv_dir: Option<PathBuf>,
}
