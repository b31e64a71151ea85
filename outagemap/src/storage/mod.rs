//! Storage abstractions and implementations
//!
//! ## Storage Implementations
//!
//! - **SurrealReportStore**: embedded SurrealDB (in-memory or RocksDB).
//!   Confirm and merge are conditional updates evaluated by the database.
//! - **MemoryReportStore**: simple in-memory storage for testing and
//!   ephemeral sessions

pub mod errors;
pub mod memory;
pub mod subscription;
#[cfg(feature = "surrealdb-embedded")]
pub mod surreal;
pub mod traits;

use std::sync::Arc;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryReportStore;
pub use subscription::{Subscription, snapshot_stream, subscribe_reports};
pub use traits::{ReportStore, ReportStream, sort_snapshot};

use crate::config::{OutageMapConfig, StorageEngine};

/// Create the report store selected by the configuration
pub async fn create_report_store(
    config: &OutageMapConfig,
) -> Result<Arc<dyn ReportStore>, StorageError> {
    let storage = &config.storage;

    match storage.engine {
        StorageEngine::Memory => {
            tracing::info!("Using in-memory report store");
            Ok(Arc::new(MemoryReportStore::with_capacity(
                storage.snapshot_capacity,
            )))
        }
        #[cfg(feature = "surrealdb-embedded")]
        StorageEngine::RocksDb => {
            let path = storage.database_path();
            std::fs::create_dir_all(&path).map_err(|e| {
                StorageError::Configuration(format!(
                    "Storage not accessible at {}: {}",
                    path.display(),
                    e
                ))
            })?;

            let store = surreal::create_rocksdb_store(
                &path.to_string_lossy(),
                surreal::SurrealStoreConfig {
                    namespace: storage.namespace.clone(),
                    database: storage.database.clone(),
                    snapshot_capacity: storage.snapshot_capacity,
                },
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "surrealdb-embedded"))]
        StorageEngine::RocksDb => Err(StorageError::Configuration(
            "RocksDB engine requires 'surrealdb-embedded' feature to be enabled".to_string(),
        )),
    }
}
