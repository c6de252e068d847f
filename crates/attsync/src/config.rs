//! Configuration management
//!
//! Settings live in a TOML file. When the file is missing a fully populated
//! default is written first and then loaded, so a fresh install always starts
//! from a file the operator can edit.

use crate::error::{Result, SyncError};
use crate::machines::MachineRegistry;
use attsync_common::LogConfig;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/attsync.toml";

/// Default database host.
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default database port.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "realtime";

/// Default database username.
pub const DEFAULT_DB_USERNAME: &str = "attsync";

/// Default school code sent with every payload.
pub const DEFAULT_SCHOOL_CODE: &str = "demo";

/// Default school display name.
pub const DEFAULT_SCHOOL_NAME: &str = "Demo School";

/// Default attendance API endpoint.
pub const DEFAULT_PRIMARY_URL: &str = "https://api.example.com/v1/attendance";

/// Default request timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Default pause between sync cycles in milliseconds.
pub const DEFAULT_SLEEP_INTERVAL_MS: u64 = 60_000;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default machine ID allow-list.
pub const DEFAULT_MACHINE_IDS: &str = "101,102,103,104,105,106";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub school: SchoolConfig,
    pub api: ApiConfig,
    pub app: AppConfig,
}

/// Database connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
}

/// School identity included in every payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolConfig {
    pub code: String,
    pub name: String,
}

/// Attendance API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub primary_url: String,
    /// Reserved endpoint, kept in the file but not dialed by the sync path
    pub fallback_url: String,
    pub timeout_ms: u64,
}

/// Application behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sleep_interval_ms: u64,
    /// Gates request-URL and raw-response detail logs
    pub debug: bool,
    pub log_level: String,
    /// Comma-separated machine ID allow-list
    pub machine_ids: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            name: DEFAULT_DB_NAME.to_string(),
            username: DEFAULT_DB_USERNAME.to_string(),
            password: String::new(),
        }
    }
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            code: DEFAULT_SCHOOL_CODE.to_string(),
            name: DEFAULT_SCHOOL_NAME.to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            fallback_url: String::new(),
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sleep_interval_ms: DEFAULT_SLEEP_INTERVAL_MS,
            debug: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            machine_ids: DEFAULT_MACHINE_IDS.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the given path.
    ///
    /// A missing file is created with default contents before loading. The
    /// notice goes to the console: load runs before logging is set up.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            Self::write_default_file(path)?;
            println!(
                "{} Default configuration created: {}",
                "✓".green(),
                path.display()
            );
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;

        Ok(config)
    }

    /// Write a fully populated default configuration file.
    pub fn write_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let rendered = toml::to_string_pretty(&Config::default())?;
        std::fs::write(path, rendered)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.port == 0 {
            return Err(SyncError::config("Database port must be greater than 0"));
        }

        if self.database.name.is_empty() {
            return Err(SyncError::config("Database name cannot be empty"));
        }

        if self.school.code.is_empty() {
            return Err(SyncError::config("School code cannot be empty"));
        }

        if self.api.primary_url.is_empty() {
            return Err(SyncError::config("Primary API URL cannot be empty"));
        }

        if self.api.timeout_ms == 0 {
            return Err(SyncError::config("API timeout must be greater than 0"));
        }

        if self.app.sleep_interval_ms == 0 {
            return Err(SyncError::config("Sleep interval must be greater than 0"));
        }

        if MachineRegistry::from_allow_list(&self.app.machine_ids).is_empty() {
            return Err(SyncError::config(
                "Machine ID allow-list must name at least one machine",
            ));
        }

        Ok(())
    }

    /// Request timeout for the attendance API.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    /// Pause between sync cycles.
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.app.sleep_interval_ms)
    }

    /// Logging setup derived from the application section.
    ///
    /// An unrecognized level falls back to the default rather than failing
    /// startup.
    pub fn log_config(&self) -> LogConfig {
        LogConfig::builder()
            .level(self.app.log_level.parse().unwrap_or_default())
            .build()
    }
}
