//! Configuration management for claimboard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, Local, Offset};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "claimboard";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "board.db";

/// Default storage key holding the serialized item collection.
pub const DEFAULT_STORAGE_KEY: &str = "claimboard-items";

/// Default export file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "物资领取状态";

/// Default pattern for human-readable timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Largest accepted UTC offset, in minutes.
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CLAIMBOARD_`, `__` between levels)
/// 2. TOML config file at `~/.config/claimboard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Export and display configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/claimboard/board.db`
    pub database_path: Option<PathBuf>,
    /// Key under which the item collection is stored.
    pub key: String,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    /// Defaults to the current working directory.
    pub directory: Option<PathBuf>,
    /// File name prefix; the date and `.csv` are appended.
    pub file_prefix: String,
    /// strftime pattern for the update timestamp column.
    pub timestamp_format: String,
    /// Offset from UTC for rendered timestamps.
    /// Defaults to the machine's local offset.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved at runtime
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            utc_offset_minutes: None,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CLAIMBOARD_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate one configuration file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, or if loading, parsing or
    /// validation fails.
    pub fn check_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::config_validation(format!(
                "configuration file {} does not exist",
                path.display()
            )));
        }
        Self::load_from(Some(path.to_path_buf()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.key.trim().is_empty() {
            return Err(Error::config_validation("storage.key must not be empty"));
        }

        if self.export.file_prefix.trim().is_empty() {
            return Err(Error::config_validation(
                "export.file_prefix must not be empty",
            ));
        }

        if StrftimeItems::new(&self.export.timestamp_format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::config_validation(format!(
                "invalid timestamp_format: {}",
                self.export.timestamp_format
            )));
        }

        if let Some(minutes) = self.export.utc_offset_minutes {
            if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
                return Err(Error::config_validation(format!(
                    "utc_offset_minutes ({minutes}) must be within ±{MAX_OFFSET_MINUTES}"
                )));
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the offset used for human-readable timestamps.
    #[must_use]
    pub fn display_offset(&self) -> FixedOffset {
        self.export
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}
