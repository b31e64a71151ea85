//! Configuration model definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::geo::{Coordinates, DEFAULT_ORIGIN};

/// Main configuration structure for OutageMap.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutageMapConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Dashboard feed windows and limits
    pub feeds: FeedConfig,

    /// Reverse geocoding configuration
    pub geocoding: GeocodingConfig,

    /// Anonymous confirmation guard configuration
    pub guard: GuardConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Report store engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    /// Process-local `HashMap`; nothing survives a restart
    Memory,

    /// Embedded SurrealDB on RocksDB under `data_dir`
    RocksDb,
}

impl fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngine::Memory => write!(f, "memory"),
            StorageEngine::RocksDb => write!(f, "rocksdb"),
        }
    }
}

impl FromStr for StorageEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageEngine::Memory),
            "rocksdb" | "rocks" => Ok(StorageEngine::RocksDb),
            _ => Err(format!("Invalid storage engine: {}", s)),
        }
    }
}

/// Configuration for the report store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub engine: StorageEngine,

    /// Base directory for persistent data (database, guard file)
    pub data_dir: PathBuf,

    /// SurrealDB namespace
    pub namespace: String,

    /// SurrealDB database
    pub database: String,

    /// Snapshots buffered per realtime subscriber
    pub snapshot_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("org", "outagemap", "outagemap")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"));

        Self {
            engine: StorageEngine::RocksDb,
            data_dir,
            namespace: "outagemap".to_string(),
            database: "reports".to_string(),
            snapshot_capacity: super::DEFAULT_SNAPSHOT_CAPACITY,
        }
    }
}

impl StorageConfig {
    /// Directory holding the RocksDB files
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("db")
    }
}

/// Windows, radius and limit for the dashboard feeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Window for the per-service status counts
    pub status_window_hours: i64,

    /// Window for the nearby reports feed
    pub nearby_window_hours: i64,

    /// Radius for the nearby reports feed, in meters
    pub nearby_radius_m: f64,

    /// Maximum nearby reports returned
    pub nearby_limit: usize,

    /// Origin used when the device location is unknown
    pub default_origin: Coordinates,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            status_window_hours: 24,
            nearby_window_hours: 48,
            nearby_radius_m: 5_000.0,
            nearby_limit: 3,
            default_origin: DEFAULT_ORIGIN,
        }
    }
}

/// Reverse geocoding provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderKind {
    BigDataCloud,
    Nominatim,
}

/// Reverse geocoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// When disabled, location names fall back to coordinates
    pub enabled: bool,

    /// Providers tried in order; the first success wins
    pub providers: Vec<GeocoderKind>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Preferred response language
    pub language: String,

    /// User agent sent with each request
    pub user_agent: String,

    /// Override for the BigDataCloud endpoint
    pub bigdatacloud_url: String,

    /// Override for the Nominatim endpoint
    pub nominatim_url: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            providers: vec![GeocoderKind::BigDataCloud, GeocoderKind::Nominatim],
            timeout_ms: 5_000,
            language: "es".to_string(),
            user_agent: format!("outagemap/{}", env!("CARGO_PKG_VERSION")),
            bigdatacloud_url: "https://api.bigdatacloud.net/data/reverse-geocode-client"
                .to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
        }
    }
}

/// Anonymous confirmation guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// File name inside the data directory
    pub file_name: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            file_name: "device_state.json".to_string(),
        }
    }
}

/// Configuration for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
