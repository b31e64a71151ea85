//! SurrealDB report store
//!
//! Works with the embedded in-memory and RocksDB engines. Confirmations and
//! provider merges are single conditional `UPDATE ... WHERE` statements, so
//! the uniqueness check and the write happen together inside the database.

use surrealdb::{Connection, Surreal};
use tokio::sync::broadcast;

use crate::storage::errors::StorageError;

mod report;
pub mod schema;

/// Namespace and database selection for the report store
#[derive(Debug, Clone)]
pub struct SurrealStoreConfig {
    pub namespace: String,
    pub database: String,
    /// Buffered snapshots per subscriber
    pub snapshot_capacity: usize,
}

impl Default for SurrealStoreConfig {
    fn default() -> Self {
        Self {
            namespace: "outagemap".to_string(),
            database: "reports".to_string(),
            snapshot_capacity: crate::config::DEFAULT_SNAPSHOT_CAPACITY,
        }
    }
}

/// Report store over a SurrealDB client
#[derive(Debug)]
pub struct SurrealReportStore<C>
where
    C: Connection + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    pub(crate) client: Surreal<C>,
    pub(crate) config: SurrealStoreConfig,
    pub(crate) snapshots: broadcast::Sender<Vec<crate::models::Report>>,
}

impl<C> SurrealReportStore<C>
where
    C: Connection + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    /// Select namespace/database and initialize the schema
    pub async fn new(client: Surreal<C>, config: SurrealStoreConfig) -> Result<Self, StorageError> {
        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Failed to set namespace/database: {}", e))
            })?;

        schema::initialize_schema(&client).await?;

        let (snapshots, _) = broadcast::channel(config.snapshot_capacity.max(1));

        Ok(Self {
            client,
            config,
            snapshots,
        })
    }

    /// Get the underlying client for advanced operations
    pub fn client(&self) -> &Surreal<C> {
        &self.client
    }

    pub fn config(&self) -> &SurrealStoreConfig {
        &self.config
    }
}

/// Embedded SurrealDB report store
pub type EmbeddedReportStore = SurrealReportStore<surrealdb::engine::local::Db>;

/// In-memory SurrealDB store
pub async fn create_memory_surreal_store(
    config: SurrealStoreConfig,
) -> Result<EmbeddedReportStore, StorageError> {
    use surrealdb::engine::local::Mem;

    tracing::info!("Creating in-memory SurrealDB report store");
    let client = Surreal::new::<Mem>(())
        .await
        .map_err(|e| StorageError::Connection(format!("Failed to create memory client: {}", e)))?;

    SurrealReportStore::new(client, config).await
}

/// RocksDB-backed SurrealDB store at `path`
pub async fn create_rocksdb_store(
    path: &str,
    config: SurrealStoreConfig,
) -> Result<EmbeddedReportStore, StorageError> {
    use surrealdb::engine::local::RocksDb;

    tracing::info!("Creating RocksDB report store at {}", path);
    let client = Surreal::new::<RocksDb>(path).await.map_err(|e| {
        StorageError::Connection(format!("Failed to create embedded database: {}", e))
    })?;

    SurrealReportStore::new(client, config).await
}
