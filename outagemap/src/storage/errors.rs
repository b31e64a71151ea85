//! Error types for storage operations

use std::error::Error;
use std::fmt;

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Configuration error
    Configuration(String),

    /// Connection error
    Connection(String),

    /// Query error
    Query(String),

    /// Internal error
    Internal(String),

    /// Validation error
    Validation(String),

    /// Report not found
    NotFound(String),

    /// The signed-in actor already confirmed this report
    AlreadyConfirmed(String),

    /// The provider is already part of this report
    AlreadyMerged(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Storage timeout error
    Timeout(String),

    /// Authorization error
    Authorization(String),

    /// Other error
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::Connection(_)
                | StorageError::Query(_)
                | StorageError::Internal(_)
                | StorageError::Timeout(_)
                | StorageError::Other(_)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StorageError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StorageError::Query(msg) => write!(f, "Query error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
            StorageError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::AlreadyConfirmed(id) => write!(f, "Report {} already confirmed", id),
            StorageError::AlreadyMerged(id) => {
                write!(f, "Provider already present on report {}", id)
            }
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::Authorization(msg) => write!(f, "Authorization error: {}", msg),
            StorageError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Convert a standard IO error to a storage error
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Other(err.to_string())
    }
}

impl From<crate::models::ValidationError> for StorageError {
    fn from(err: crate::models::ValidationError) -> Self {
        StorageError::Validation(err.to_string())
    }
}

#[cfg(feature = "surrealdb-embedded")]
impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Query(err.to_string())
    }
}
