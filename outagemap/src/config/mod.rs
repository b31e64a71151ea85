//! Configuration system for OutageMap.
//!
//! Configuration is layered: built-in defaults, then an optional file, then
//! `OUTAGEMAP_` environment variables. Nested keys use a double underscore,
//! e.g. `OUTAGEMAP_STORAGE__ENGINE=memory`.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
pub mod validation;

pub use builder::ConfigBuilder;
pub use loader::{ConfigLoader, load_config, load_config_from};
pub use models::*;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "outagemap.toml",
    "outagemap.yaml",
    "outagemap.yml",
    "outagemap.json",
    ".outagemap/config.toml",
    ".outagemap/config.yaml",
    ".outagemap/config.yml",
    ".outagemap/config.json",
];

/// Environment variable prefix for OutageMap configuration
pub const ENV_PREFIX: &str = "OUTAGEMAP_";

/// Snapshots buffered per realtime subscriber before it is considered lagged
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 64;

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
