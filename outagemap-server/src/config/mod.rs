//! Server configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// JWT secret used to verify bearer tokens
    pub jwt_secret: String,

    /// OutageMap library configuration file
    pub config_file_path: Option<PathBuf>,

    /// Data directory override for the report store
    pub data_dir: Option<PathBuf>,

    /// Use the in-memory report store regardless of the library configuration
    pub memory_storage: bool,

    /// Close WebSocket connections idle for this many seconds
    pub websocket_timeout: u64,

    /// Anonymous devices whose confirmations are remembered at once
    pub max_device_guards: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_request_size: 1024 * 1024, // 1MB
            jwt_secret: "".to_string(),    // Generated at runtime if not provided
            config_file_path: None,
            data_dir: None,
            memory_storage: false,
            websocket_timeout: 300, // 5 minutes
            max_device_guards: 10_000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from CLI arguments and environment variables
    /// CLI arguments take precedence over environment variables
    pub fn from_cli_and_env(cli_args: crate::cli::CliArgs) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = cli_args.port {
            config.port = port;
        } else if let Ok(port) = env::var("OUTAGEMAP_PORT") {
            config.port = port.parse()?;
        }

        if let Some(max_size) = cli_args.max_request_size {
            config.max_request_size = max_size;
        } else if let Ok(max_size) = env::var("OUTAGEMAP_MAX_REQUEST_SIZE") {
            config.max_request_size = max_size.parse()?;
        }

        if let Some(jwt_secret) = cli_args.jwt_secret {
            config.jwt_secret = jwt_secret;
        } else if let Ok(jwt_secret) = env::var("OUTAGEMAP_JWT_SECRET") {
            config.jwt_secret = jwt_secret;
        }
        if config.jwt_secret.is_empty() {
            tracing::warn!("No JWT secret configured; generated one for this process");
            config.jwt_secret = Self::generate_jwt_secret();
        }

        if let Some(config_path) = cli_args.config_file {
            config.config_file_path = Some(config_path);
        } else if let Ok(config_path) = env::var("OUTAGEMAP_CONFIG_FILE") {
            config.config_file_path = Some(PathBuf::from(config_path));
        }

        if let Some(data_dir) = cli_args.data_dir {
            config.data_dir = Some(data_dir);
        }

        config.memory_storage = cli_args.memory_storage;

        if let Some(timeout) = cli_args.websocket_timeout {
            config.websocket_timeout = timeout;
        } else if let Ok(timeout) = env::var("OUTAGEMAP_WEBSOCKET_TIMEOUT") {
            config.websocket_timeout = timeout.parse()?;
        }

        if let Some(max_guards) = cli_args.max_device_guards {
            config.max_device_guards = max_guards;
        } else if let Ok(max_guards) = env::var("OUTAGEMAP_MAX_DEVICE_GUARDS") {
            config.max_device_guards = max_guards.parse()?;
        }

        Ok(config)
    }

    /// Generate a secure random JWT secret
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;
        use rand::distr::Alphanumeric;
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }

    /// Load the library configuration, then apply the storage overrides
    pub fn library_config(&self) -> Result<outagemap::config::OutageMapConfig> {
        let mut config = match &self.config_file_path {
            Some(path) => outagemap::config::load_config_from(path)?,
            None => outagemap::config::load_config()?,
        };

        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if self.memory_storage {
            config.storage.engine = outagemap::config::StorageEngine::Memory;
        }

        outagemap::config::validation::validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_is_long() {
        let secret = ServerConfig::generate_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, ServerConfig::generate_jwt_secret());
    }

    #[test]
    fn test_memory_override() {
        let config = ServerConfig {
            memory_storage: true,
            ..ServerConfig::default()
        };
        let library = config.library_config().unwrap();
        assert_eq!(library.storage.engine, outagemap::config::StorageEngine::Memory);
    }
}
