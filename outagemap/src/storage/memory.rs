//! In-memory report store for tests and ephemeral sessions

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::models::{NewReport, Report};
use crate::storage::errors::StorageError;
use crate::storage::subscription::snapshot_stream;
use crate::storage::traits::{ReportStore, ReportStream, sort_snapshot};

/// Report store backed by a `HashMap`
#[derive(Debug)]
pub struct MemoryReportStore {
    reports: RwLock<HashMap<String, Report>>,
    snapshots: broadcast::Sender<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::with_capacity(crate::config::DEFAULT_SNAPSHOT_CAPACITY)
    }

    /// Create a store whose snapshot channel buffers `capacity` snapshots
    pub fn with_capacity(capacity: usize) -> Self {
        let (snapshots, _) = broadcast::channel(capacity.max(1));
        Self {
            reports: RwLock::new(HashMap::new()),
            snapshots,
        }
    }

    fn ordered(reports: &HashMap<String, Report>) -> Vec<Report> {
        let mut snapshot: Vec<Report> = reports.values().cloned().collect();
        sort_snapshot(&mut snapshot);
        snapshot
    }

    fn publish(&self, reports: &HashMap<String, Report>) {
        if self.snapshots.receiver_count() == 0 {
            return;
        }
        // Send only fails when every receiver is gone
        let _ = self.snapshots.send(Self::ordered(reports));
    }
}

impl Default for MemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create_report(&self, new_report: NewReport) -> Result<Report, StorageError> {
        new_report.validate()?;

        let id = Uuid::new_v4().to_string();
        let report = Report::from_new(id.clone(), new_report, Utc::now());

        let mut reports = self.reports.write().await;
        reports.insert(id.clone(), report.clone());
        self.publish(&reports);

        tracing::info!(
            report_id = %id,
            service_type = %report.service_type,
            provider = %report.provider,
            "Report created"
        );
        Ok(report)
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StorageError> {
        let reports = self.reports.read().await;
        Ok(reports.get(id).cloned())
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StorageError> {
        let reports = self.reports.read().await;
        Ok(Self::ordered(&reports))
    }

    async fn confirm_report(&self, id: &str, actor: Option<&str>) -> Result<Report, StorageError> {
        let mut reports = self.reports.write().await;
        let report = reports
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("Report with id {} not found", id)))?;

        if !report.apply_confirmation(actor) {
            tracing::debug!(report_id = %id, "Duplicate confirmation rejected");
            return Err(StorageError::AlreadyConfirmed(id.to_string()));
        }

        let updated = report.clone();
        self.publish(&reports);

        tracing::debug!(
            report_id = %id,
            confirmations = updated.confirmations,
            anonymous = actor.is_none(),
            "Report confirmed"
        );
        Ok(updated)
    }

    async fn merge_provider(
        &self,
        id: &str,
        provider: &str,
        actor: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut reports = self.reports.write().await;
        let report = reports
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("Report with id {} not found", id)))?;

        if !report.apply_merge(provider) {
            return Err(StorageError::AlreadyMerged(id.to_string()));
        }

        let merged = report.provider.clone();
        self.publish(&reports);

        tracing::info!(
            report_id = %id,
            provider = %merged,
            actor = actor.unwrap_or("anonymous"),
            "Provider merged"
        );
        Ok(merged)
    }

    fn subscribe(&self) -> ReportStream {
        snapshot_stream(self.snapshots.subscribe())
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut reports = self.reports.write().await;
        reports.clear();
        self.publish(&reports);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::models::{Identity, ReportDraft, ServiceType};
    use futures::StreamExt;

    fn new_report(service_type: ServiceType, provider: &str) -> NewReport {
        NewReport::from_draft(
            &ReportDraft::new(service_type, provider),
            Coordinates::new(9.9281, -84.0907),
            &Identity::new("creator"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryReportStore::new();
        let report = store
            .create_report(new_report(ServiceType::Water, "AyA"))
            .await
            .unwrap();

        assert!(!report.id.is_empty());
        assert_eq!(report.confirmations, 0);
        let fetched = store.get_report(&report.id).await.unwrap().unwrap();
        assert_eq!(fetched, report);
        assert!(store.get_report("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryReportStore::new();
        let first = store
            .create_report(new_report(ServiceType::Water, "AyA"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store
            .create_report(new_report(ServiceType::Electricity, "ICE"))
            .await
            .unwrap();

        let ids: Vec<String> = store
            .list_reports()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_confirm_once_per_user() {
        let store = MemoryReportStore::new();
        let report = store
            .create_report(new_report(ServiceType::Water, "AyA"))
            .await
            .unwrap();

        let updated = store.confirm_report(&report.id, Some("u1")).await.unwrap();
        assert_eq!(updated.confirmations, 1);

        let err = store.confirm_report(&report.id, Some("u1")).await.unwrap_err();
        assert_eq!(err, StorageError::AlreadyConfirmed(report.id.clone()));

        let updated = store.confirm_report(&report.id, None).await.unwrap();
        assert_eq!(updated.confirmations, 2);
        assert_eq!(updated.confirmed_by, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn test_confirm_missing_report() {
        let store = MemoryReportStore::new();
        let err = store.confirm_report("nope", None).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = MemoryReportStore::new();
        let report = store
            .create_report(new_report(ServiceType::Water, "AyA"))
            .await
            .unwrap();

        let merged = store
            .merge_provider(&report.id, "Municipalidad", Some("u1"))
            .await
            .unwrap();
        assert_eq!(merged, "AyA + Municipalidad");

        let err = store
            .merge_provider(&report.id, "Municipalidad", Some("u2"))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::AlreadyMerged(report.id.clone()));

        let stored = store.get_report(&report.id).await.unwrap().unwrap();
        assert_eq!(stored.provider, "AyA + Municipalidad");
    }

    #[tokio::test]
    async fn test_subscribe_receives_snapshots() {
        let store = MemoryReportStore::new();
        let mut stream = store.subscribe();

        store
            .create_report(new_report(ServiceType::Water, "AyA"))
            .await
            .unwrap();

        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].provider, "AyA");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryReportStore::new();
        store
            .create_report(new_report(ServiceType::Water, "AyA"))
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.list_reports().await.unwrap().is_empty());
    }
}
