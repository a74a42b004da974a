//! Configuration management for docvault
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQLite storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Output configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// SQLite storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit database file; relative paths resolve against the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_file: Option<PathBuf>,

    /// How long a writer waits for another process holding the lock
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// File extensions (without dot) picked up when importing a directory
    #[serde(default = "default_ingest_extensions")]
    pub extensions: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Checksum hex digits shown in human-readable output
    #[serde(default = "default_checksum_prefix_len")]
    pub checksum_prefix_len: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for docvault data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_file: None,
            busy_timeout_secs: default_busy_timeout_secs(),
            max_connections: default_max_connections(),
        }
    }
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: default_ingest_extensions(),
        }
    }
}

impl IngestConfig {
    /// Whether a path carries one of the configured extensions (case-insensitive)
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            checksum_prefix_len: default_checksum_prefix_len(),
        }
    }
}

impl Config {
    /// Get the default base directory for docvault (~/.docvault)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docvault")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join(default_db_file_name()),
            base_dir: base,
        };
        self.apply_db_override();
    }

    /// Resolve `storage.db_file` against the base directory
    fn apply_db_override(&mut self) {
        if let Some(db_file) = &self.storage.db_file {
            self.paths.db_file = if db_file.is_absolute() {
                db_file.clone()
            } else {
                self.paths.base_dir.join(db_file)
            };
        }
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Set up paths based on config file location
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join(default_db_file_name()),
            base_dir: base,
        };
        config.apply_db_override();

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    /// when no config file exists there
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            return Self::load(&config.paths.config_file);
        }

        debug!("No config file found, using defaults");
        Ok(config)
    }

    /// Point the database at an explicit file, overriding everything else
    pub fn with_db_file(mut self, db_file: PathBuf) -> Self {
        self.paths.db_file = db_file;
        self
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Build a configuration rooted at `base_dir` without reading anything
    pub fn rooted_at(base_dir: PathBuf) -> Self {
        let mut config = Config::default();
        config.init_paths(Some(base_dir));
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.max_connections == 0 {
            return Err(Error::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if !(4..=64).contains(&self.display.checksum_prefix_len) {
            return Err(Error::Config(
                "display.checksum_prefix_len must be between 4 and 64".to_string(),
            ));
        }

        if self.ingest.extensions.is_empty() {
            return Err(Error::Config(
                "ingest.extensions must list at least one extension".to_string(),
            ));
        }

        Ok(())
    }
}
