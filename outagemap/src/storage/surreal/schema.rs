//! Schema initialization for the report table

use crate::storage::errors::StorageError;
use surrealdb::{Connection, Surreal};

/// Define the report table, its fields and indexes
pub async fn initialize_schema<C>(client: &Surreal<C>) -> Result<(), StorageError>
where
    C: Connection,
{
    let report_table_query = r#"
        DEFINE TABLE IF NOT EXISTS report SCHEMAFULL
        COMMENT "Community outage reports";

        DEFINE FIELD IF NOT EXISTS service_type ON report TYPE string
            ASSERT $value IN ["electricity", "water", "internet", "other"];
        DEFINE FIELD IF NOT EXISTS provider ON report TYPE string ASSERT $value != "";
        DEFINE FIELD IF NOT EXISTS title ON report TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS description ON report TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS latitude ON report TYPE float;
        DEFINE FIELD IF NOT EXISTS longitude ON report TYPE float;
        DEFINE FIELD IF NOT EXISTS location_name ON report TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS created_at ON report TYPE datetime DEFAULT time::now();
        DEFINE FIELD IF NOT EXISTS confirmations ON report TYPE int DEFAULT 0 ASSERT $value >= 0;
        DEFINE FIELD IF NOT EXISTS confirmed_by ON report TYPE array<string> DEFAULT [];
        DEFINE FIELD IF NOT EXISTS user_id ON report TYPE string;
        DEFINE FIELD IF NOT EXISTS user_name ON report TYPE option<string>;

        DEFINE INDEX IF NOT EXISTS report_created_at_idx ON report FIELDS created_at;
        DEFINE INDEX IF NOT EXISTS report_service_idx ON report FIELDS service_type;
    "#;

    client
        .query(report_table_query)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to define report table: {}", e)))?
        .check()
        .map_err(|e| StorageError::Query(format!("Report schema rejected: {}", e)))?;

    tracing::debug!("Report schema initialized");
    Ok(())
}
