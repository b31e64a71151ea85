//! Trait definitions for report storage

use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;

use crate::models::{NewReport, Report};
use crate::storage::errors::StorageError;

/// Stream of full report snapshots, newest first.
///
/// An `Err` item means the subscriber fell behind; the next `Ok` item is a
/// complete snapshot again.
pub type ReportStream = Pin<Box<dyn Stream<Item = Result<Vec<Report>, StorageError>> + Send>>;

/// Realtime document store holding outage reports
#[async_trait]
pub trait ReportStore: Send + Sync + Debug + 'static {
    /// Persist a new report, assigning its id and creation time
    async fn create_report(&self, new_report: NewReport) -> Result<Report, StorageError>;

    /// Get a report by its ID
    async fn get_report(&self, id: &str) -> Result<Option<Report>, StorageError>;

    /// All reports ordered by `created_at` descending, ties broken by id
    async fn list_reports(&self) -> Result<Vec<Report>, StorageError>;

    /// Add one confirmation.
    ///
    /// A signed-in actor is recorded in `confirmed_by` and may confirm only
    /// once (`AlreadyConfirmed`). `None` is an anonymous confirmation and only
    /// increments the counter.
    async fn confirm_report(&self, id: &str, actor: Option<&str>) -> Result<Report, StorageError>;

    /// Append `provider` to the report's provider list.
    ///
    /// The check against the current stored value and the append happen
    /// atomically; `AlreadyMerged` when the value already contains it.
    /// Returns the new provider string.
    async fn merge_provider(
        &self,
        id: &str,
        provider: &str,
        actor: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Snapshots pushed after every change
    fn subscribe(&self) -> ReportStream;

    /// Check if the store is healthy and available
    async fn health_check(&self) -> Result<bool, StorageError>;

    /// Clear all data in the store
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Sort reports newest first, ties broken by id
pub fn sort_snapshot(reports: &mut [Report]) {
    reports.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
