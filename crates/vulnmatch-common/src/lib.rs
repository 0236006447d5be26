//! VulnMatch Common - Shared configuration and logging

pub mod config;
pub mod logging;

pub use config::{Config, DatabaseConfig, FeedsConfig, LoggingConfig};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogFormat};
