//! Report storage implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, RecordId};
use uuid::Uuid;

use super::SurrealReportStore;
use crate::geo::Coordinates;
use crate::models::{NewReport, Report, ServiceType};
use crate::storage::errors::StorageError;
use crate::storage::subscription::snapshot_stream;
use crate::storage::traits::{ReportStore, ReportStream, sort_snapshot};

const TABLE: &str = "report";

/// Internal representation of a report record
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SurrealReport {
    id: RecordId,
    service_type: ServiceType,
    provider: String,
    title: Option<String>,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    location_name: Option<String>,
    created_at: DateTime<Utc>,
    confirmations: u32,
    #[serde(default)]
    confirmed_by: Vec<String>,
    user_id: String,
    user_name: Option<String>,
}

impl From<SurrealReport> for Report {
    fn from(record: SurrealReport) -> Self {
        Self {
            id: key_string(&record.id),
            service_type: record.service_type,
            provider: record.provider,
            title: record.title,
            description: record.description,
            location: Coordinates::new(record.latitude, record.longitude),
            location_name: record.location_name,
            created_at: record.created_at,
            confirmations: record.confirmations,
            confirmed_by: record.confirmed_by,
            user_id: record.user_id,
            user_name: record.user_name,
        }
    }
}

/// Record key without the `⟨⟩` escaping SurrealDB adds to some keys
fn key_string(id: &RecordId) -> String {
    let key = id.key().to_string();
    key.strip_prefix('⟨')
        .and_then(|k| k.strip_suffix('⟩'))
        .map(str::to_string)
        .unwrap_or(key)
}

fn record_id(id: &str) -> RecordId {
    RecordId::from((TABLE, id))
}

impl<C> SurrealReportStore<C>
where
    C: Connection + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    async fn fetch(&self, id: &str) -> Result<Option<Report>, StorageError> {
        let mut result = self
            .client
            .query("SELECT * FROM $id")
            .bind(("id", record_id(id)))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to get report: {}", e)))?;

        let reports: Vec<SurrealReport> = result
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to extract report: {}", e)))?;

        Ok(reports.into_iter().next().map(Report::from))
    }

    /// An empty conditional update means the record is gone or the
    /// condition failed; tell the two apart.
    async fn explain_noop(&self, id: &str, already: StorageError) -> StorageError {
        match self.fetch(id).await {
            Ok(Some(_)) => already,
            Ok(None) => StorageError::NotFound(format!("Report with id {} not found", id)),
            Err(e) => e,
        }
    }

    async fn publish(&self) {
        if self.snapshots.receiver_count() == 0 {
            return;
        }
        match self.list_reports().await {
            Ok(snapshot) => {
                let _ = self.snapshots.send(snapshot);
            }
            Err(e) => tracing::warn!("Failed to publish report snapshot: {}", e),
        }
    }
}

#[async_trait]
impl<C> ReportStore for SurrealReportStore<C>
where
    C: Connection + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    async fn create_report(&self, new_report: NewReport) -> Result<Report, StorageError> {
        new_report.validate()?;

        let id = Uuid::new_v4().simple().to_string();
        let title = new_report.resolved_title();

        let query = r#"
            CREATE $id CONTENT {
                service_type: $service_type,
                provider: $provider,
                title: $title,
                description: $description,
                latitude: $latitude,
                longitude: $longitude,
                location_name: $location_name,
                created_at: time::now(),
                confirmations: 0,
                confirmed_by: [],
                user_id: $user_id,
                user_name: $user_name
            }
        "#;

        let mut result = self
            .client
            .query(query)
            .bind(("id", record_id(&id)))
            .bind(("service_type", new_report.service_type))
            .bind(("provider", new_report.provider))
            .bind(("title", title))
            .bind(("description", new_report.description))
            .bind(("latitude", new_report.location.latitude))
            .bind(("longitude", new_report.location.longitude))
            .bind(("location_name", new_report.location_name))
            .bind(("user_id", new_report.user_id))
            .bind(("user_name", new_report.user_name))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to create report: {}", e)))?;

        let created: Vec<SurrealReport> = result
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to extract created report: {}", e)))?;

        let report = created
            .into_iter()
            .next()
            .map(Report::from)
            .ok_or_else(|| StorageError::Internal("No report created".to_string()))?;

        tracing::info!(
            report_id = %report.id,
            service_type = %report.service_type,
            provider = %report.provider,
            "Report created"
        );

        self.publish().await;
        Ok(report)
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StorageError> {
        self.fetch(id).await
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StorageError> {
        let mut result = self
            .client
            .query("SELECT * FROM report ORDER BY created_at DESC")
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list reports: {}", e)))?;

        let records: Vec<SurrealReport> = result
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to extract reports: {}", e)))?;

        let mut reports: Vec<Report> = records.into_iter().map(Report::from).collect();
        sort_snapshot(&mut reports);
        Ok(reports)
    }

    async fn confirm_report(&self, id: &str, actor: Option<&str>) -> Result<Report, StorageError> {
        let mut result = match actor {
            Some(user_id) => {
                let query = r#"
                    UPDATE $id SET
                        confirmations += 1,
                        confirmed_by += $actor
                    WHERE $actor NOT IN confirmed_by
                    RETURN AFTER
                "#;
                self.client
                    .query(query)
                    .bind(("id", record_id(id)))
                    .bind(("actor", user_id.to_string()))
                    .await
            }
            None => {
                self.client
                    .query("UPDATE $id SET confirmations += 1 RETURN AFTER")
                    .bind(("id", record_id(id)))
                    .await
            }
        }
        .map_err(|e| StorageError::Query(format!("Failed to confirm report: {}", e)))?;

        let updated: Vec<SurrealReport> = result
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to extract confirmed report: {}", e)))?;

        let Some(report) = updated.into_iter().next().map(Report::from) else {
            return Err(self
                .explain_noop(id, StorageError::AlreadyConfirmed(id.to_string()))
                .await);
        };

        tracing::debug!(
            report_id = %id,
            confirmations = report.confirmations,
            anonymous = actor.is_none(),
            "Report confirmed"
        );

        self.publish().await;
        Ok(report)
    }

    async fn merge_provider(
        &self,
        id: &str,
        provider: &str,
        actor: Option<&str>,
    ) -> Result<String, StorageError> {
        let query = r#"
            UPDATE $id SET
                provider = string::concat(provider, ' + ', $provider)
            WHERE !string::contains(provider, $provider)
            RETURN AFTER
        "#;

        let mut result = self
            .client
            .query(query)
            .bind(("id", record_id(id)))
            .bind(("provider", provider.to_string()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to merge provider: {}", e)))?;

        let updated: Vec<SurrealReport> = result
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to extract merged report: {}", e)))?;

        let Some(report) = updated.into_iter().next() else {
            return Err(self
                .explain_noop(id, StorageError::AlreadyMerged(id.to_string()))
                .await);
        };

        tracing::info!(
            report_id = %id,
            provider = %report.provider,
            actor = actor.unwrap_or("anonymous"),
            "Provider merged"
        );

        self.publish().await;
        Ok(report.provider)
    }

    fn subscribe(&self) -> ReportStream {
        snapshot_stream(self.snapshots.subscribe())
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        self.client
            .query("INFO FOR DB")
            .await
            .map_err(|e| StorageError::Connection(format!("Health check failed: {}", e)))?;

        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.client
            .query("DELETE FROM report")
            .await
            .map_err(|e| StorageError::Query(format!("Failed to clear table: {}", e)))?;

        self.publish().await;
        Ok(())
    }
}
