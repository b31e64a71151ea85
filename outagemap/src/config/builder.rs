//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use crate::geo::Coordinates;
use std::path::{Path, PathBuf};

/// Builder for creating OutageMapConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: OutageMapConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: OutageMapConfig::default(),
        }
    }

    /// Set the base data directory.
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Select the report store engine
    pub fn with_storage_engine(mut self, engine: StorageEngine) -> Self {
        self.config.storage.engine = engine;
        self
    }

    /// Use the in-memory report store (good for testing)
    pub fn with_memory_storage(self) -> Self {
        self.with_storage_engine(StorageEngine::Memory)
    }

    /// Use the embedded RocksDB report store
    pub fn with_persistent_storage(self) -> Self {
        self.with_storage_engine(StorageEngine::RocksDb)
    }

    /// Set the SurrealDB namespace and database.
    pub fn with_database(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.config.storage.namespace = namespace.into();
        self.config.storage.database = database.into();
        self
    }

    /// Replace the feed settings.
    pub fn with_feeds(mut self, feeds: FeedConfig) -> Self {
        self.config.feeds = feeds;
        self
    }

    /// Set the origin used when no device location is known.
    pub fn with_default_origin(mut self, origin: Coordinates) -> Self {
        self.config.feeds.default_origin = origin;
        self
    }

    /// Turn reverse geocoding off; location names fall back to coordinates.
    pub fn without_geocoding(mut self) -> Self {
        self.config.geocoding.enabled = false;
        self
    }

    /// Set the geocoder providers, tried in order.
    pub fn with_geocoders(mut self, providers: Vec<GeocoderKind>) -> Self {
        self.config.geocoding.enabled = true;
        self.config.geocoding.providers = providers;
        self
    }

    /// Set the per-request geocoder timeout.
    pub fn with_geocoding_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.geocoding.timeout_ms = timeout_ms;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Create a configuration for development with in-memory storage.
    ///
    /// Debug-level logging, no network geocoding.
    pub fn development() -> Self {
        Self::new()
            .with_memory_storage()
            .without_geocoding()
            .with_log_level(LogLevel::Debug)
    }

    /// Create a configuration for automated tests.
    pub fn testing() -> Self {
        Self::development().with_data_dir(PathBuf::from("./test_data"))
    }

    /// Create a production-ready configuration with persistent storage.
    pub fn production() -> Self {
        Self::new()
            .with_persistent_storage()
            .with_log_format(LogFormat::Json)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<OutageMapConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
