//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &OutageMapConfig) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_feed_config(&config.feeds)?;
    validate_geocoding_config(&config.geocoding)?;

    if config.guard.file_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Guard file name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate storage configuration.
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.engine == StorageEngine::RocksDb && config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Data directory cannot be empty".to_string(),
        ));
    }
    if config.namespace.is_empty() {
        return Err(ConfigError::ValidationError(
            "SurrealDB namespace cannot be empty".to_string(),
        ));
    }
    if config.database.is_empty() {
        return Err(ConfigError::ValidationError(
            "SurrealDB database cannot be empty".to_string(),
        ));
    }
    if config.snapshot_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Snapshot capacity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validate feed windows, radius and limit.
fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    if config.status_window_hours <= 0 {
        return Err(ConfigError::ValidationError(
            "status_window_hours must be greater than 0".to_string(),
        ));
    }
    if config.nearby_window_hours <= 0 {
        return Err(ConfigError::ValidationError(
            "nearby_window_hours must be greater than 0".to_string(),
        ));
    }
    if !(config.nearby_radius_m.is_finite() && config.nearby_radius_m > 0.0) {
        return Err(ConfigError::ValidationError(
            "nearby_radius_m must be a positive number".to_string(),
        ));
    }
    if config.nearby_limit == 0 {
        return Err(ConfigError::ValidationError(
            "nearby_limit must be greater than 0".to_string(),
        ));
    }
    if !config.default_origin.is_valid() {
        return Err(ConfigError::ValidationError(format!(
            "default_origin is not a valid coordinate: {}",
            config.default_origin
        )));
    }
    Ok(())
}

/// Validate geocoding configuration.
fn validate_geocoding_config(config: &GeocodingConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }
    if config.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Geocoding timeout must be greater than 0".to_string(),
        ));
    }
    if config.providers.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one geocoding provider is required when geocoding is enabled".to_string(),
        ));
    }
    Ok(())
}
