//! # Terminal Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GESTPRO_DB_PATH=/var/lib/gestpro/store.db                          │
//! │     GESTPRO_CHUNK_SIZE=200                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/pos.toml (Linux)                                     │
//! │     ~/Library/Application Support/com.gestpro.pos/pos.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "gestpro.db"
//! max_connections = 5
//!
//! [checkout]
//! scan_debounce_ms = 2000
//! commit_attempts = 3
//! low_stock_threshold = 10
//!
//! [snapshot]
//! chunk_size = 400
//!
//! [logging]
//! filter = "info,gestpro=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use gestpro_core::report::DEFAULT_LOW_STOCK_THRESHOLD;
use gestpro_core::scan::DEFAULT_SCAN_DEBOUNCE_MS;
use gestpro_core::MAX_CHUNK_SIZE;
use gestpro_db::{DbConfig, DEFAULT_COMMIT_ATTEMPTS};

use crate::logging::DEFAULT_LOG_FILTER;

/// Config file name inside the platform config directory.
const CONFIG_FILE: &str = "pos.toml";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Relative paths resolve against the working directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "gestpro", "pos")
        .map(|dirs| dirs.data_dir().join("gestpro.db"))
        .unwrap_or_else(|| PathBuf::from("gestpro.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Camera scans of the same code closer than this are ignored.
    #[serde(default = "default_scan_debounce")]
    pub scan_debounce_ms: i64,

    /// Tries per sale commit before a write conflict is surfaced.
    #[serde(default = "default_commit_attempts")]
    pub commit_attempts: u32,

    /// Products below this stock show up in the low-stock report.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_scan_debounce() -> i64 {
    DEFAULT_SCAN_DEBOUNCE_MS
}

fn default_commit_attempts() -> u32 {
    DEFAULT_COMMIT_ATTEMPTS
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            scan_debounce_ms: default_scan_debounce(),
            commit_attempts: default_commit_attempts(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSettings {
    /// Records per restore/wipe transaction. At most 400.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    MAX_CHUNK_SIZE
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        SnapshotSettings {
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// PosConfig
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub snapshot: SnapshotSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load terminal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Terminal config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.checkout.scan_debounce_ms < 0 {
            return Err(ConfigError::Invalid(
                "checkout.scan_debounce_ms must not be negative".into(),
            ));
        }
        if self.checkout.commit_attempts == 0 {
            return Err(ConfigError::Invalid(
                "checkout.commit_attempts must be greater than 0".into(),
            ));
        }
        if self.snapshot.chunk_size == 0 || self.snapshot.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "snapshot.chunk_size must be between 1 and {}",
                MAX_CHUNK_SIZE
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("GESTPRO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("GESTPRO_DB_MAX_CONNECTIONS") {
            if let Ok(m) = max.parse::<u32>() {
                self.database.max_connections = m;
            }
        }

        if let Ok(ms) = std::env::var("GESTPRO_SCAN_DEBOUNCE_MS") {
            if let Ok(v) = ms.parse::<i64>() {
                self.checkout.scan_debounce_ms = v;
            }
        }

        if let Ok(attempts) = std::env::var("GESTPRO_COMMIT_ATTEMPTS") {
            if let Ok(v) = attempts.parse::<u32>() {
                debug!(attempts = v, "Overriding commit attempts from environment");
                self.checkout.commit_attempts = v;
            }
        }

        if let Ok(threshold) = std::env::var("GESTPRO_LOW_STOCK_THRESHOLD") {
            if let Ok(v) = threshold.parse::<i64>() {
                self.checkout.low_stock_threshold = v;
            }
        }

        if let Ok(size) = std::env::var("GESTPRO_CHUNK_SIZE") {
            match size.parse::<usize>() {
                Ok(v) => self.snapshot.chunk_size = v,
                Err(_) => warn!(value = %size, "Ignoring unparsable GESTPRO_CHUNK_SIZE"),
            }
        }

        if let Ok(filter) = std::env::var("GESTPRO_LOG") {
            self.logging.filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gestpro", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Pool configuration for [`gestpro_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}
