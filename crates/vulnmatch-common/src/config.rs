//! Configuration management for VulnMatch components

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vulnmatch_core::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vulnerability database artifact settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Feed input settings
    #[serde(default)]
    pub feeds: FeedsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (VULNMATCH_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("VULNMATCH_DB_PATH") {
            self.database.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("VULNMATCH_FEEDS_DIR") {
            self.feeds.input_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("VULNMATCH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("VULNMATCH_LOG_FORMAT") {
            self.logging.format = val;
        }
        self
    }
}

/// Artifact location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the vulnerability database SQLite artifact
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/vulnmatch/vulndb.sqlite"),
        }
    }
}

/// Feed input configuration
///
/// Feed files are delivered already decompressed and decoded by the download
/// collaborators; these paths only tell the builder where to find them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Base directory holding feed input files
    pub input_dir: Option<PathBuf>,

    /// NVD CVE JSON feed files (one per year)
    #[serde(default)]
    pub cve_feeds: Vec<PathBuf>,

    /// Vendor aliases XML file
    pub vendor_aliases: Option<PathBuf>,

    /// Product aliases XML file
    pub product_aliases: Option<PathBuf>,

    /// Product ignore-list XML file
    pub ignore_list: Option<PathBuf>,

    /// MSRC vulnerability JSON file
    pub msrc: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database.path = path.into();
        self
    }

    pub fn cve_feed(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.feeds.cve_feeds.push(path.into());
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
