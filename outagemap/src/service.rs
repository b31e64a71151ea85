//! Application façade over the report store, geocoder and feeds

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::{FeedConfig, OutageMapConfig};
use crate::dedup::{Resolver, Selection, SelectionError, SelectionOutcome, classify};
use crate::feeds::{self, NearbyReport, ServiceStatus};
use crate::geo::Coordinates;
use crate::geocoding::{
    DEFAULT_GEOCODE_TIMEOUT, Geocoder, NoopGeocoder, create_geocoder, resolve_location_name,
};
use crate::guard::AnonymousGuard;
use crate::models::{Identity, NewReport, Report, ReportDraft};
use crate::storage::{self, ReportStore, StorageError, Subscription, subscribe_reports};
use crate::{OutageMapError, Result};

/// Report operations shared by the CLI and the HTTP server
#[derive(Debug, Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    geocoder: Arc<dyn Geocoder>,
    geocode_timeout: Duration,
    feeds: FeedConfig,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, geocoder: Arc<dyn Geocoder>, feeds: FeedConfig) -> Self {
        Self {
            store,
            geocoder,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            feeds,
        }
    }

    /// Bound on reverse geocoding before the coordinates are used instead
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Store only; location names fall back to coordinates
    pub fn with_store(store: Arc<dyn ReportStore>) -> Self {
        Self::new(store, Arc::new(NoopGeocoder), FeedConfig::default())
    }

    /// Build the store and geocoder described by `config`
    pub async fn from_config(config: &OutageMapConfig) -> Result<Self> {
        let store = storage::create_report_store(config).await?;
        let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder(&config.geocoding)?);
        Ok(Self::new(store, geocoder, config.feeds.clone())
            .with_geocode_timeout(Duration::from_millis(config.geocoding.timeout_ms)))
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    pub fn feed_config(&self) -> &FeedConfig {
        &self.feeds
    }

    /// Persist a new report on behalf of `identity`.
    ///
    /// The creator fields always come from the identity. A missing location
    /// name is reverse geocoded.
    #[instrument(skip(self, new_report), fields(user = %identity.id))]
    pub async fn create_report(&self, identity: &Identity, mut new_report: NewReport) -> Result<Report> {
        new_report.user_id = identity.id.clone();
        if new_report.user_name.is_none() {
            new_report.user_name = identity.display_name().map(str::to_string);
        }
        new_report.validate()?;

        let missing_name = new_report
            .location_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty());
        if missing_name {
            let name = resolve_location_name(
                self.geocoder.as_ref(),
                &new_report.location,
                self.geocode_timeout,
            )
            .await;
            debug!(location_name = %name, "Resolved location name");
            new_report.location_name = Some(name);
        }

        let report = self.store.create_report(new_report).await?;
        info!(report_id = %report.id, service = %report.service_type, "Report created");
        Ok(report)
    }

    /// Create a report from a draft at a picked point
    pub async fn create_from_draft(
        &self,
        identity: &Identity,
        draft: &ReportDraft,
        point: Coordinates,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Report> {
        let mut new_report = NewReport::from_draft(draft, point, identity)?;
        new_report.title = title;
        new_report.description = description;
        self.create_report(identity, new_report).await
    }

    pub async fn list_reports(&self) -> Result<Vec<Report>> {
        Ok(self.store.list_reports().await?)
    }

    pub async fn get_report(&self, id: &str) -> Result<Report> {
        self.store
            .get_report(id)
            .await?
            .ok_or_else(|| OutageMapError::Storage(StorageError::NotFound(id.to_string())))
    }

    /// Classify a picked point against the current snapshot
    pub async fn classify(&self, point: Coordinates, draft: &ReportDraft) -> std::result::Result<Selection, SelectionError> {
        let snapshot = self
            .store
            .list_reports()
            .await
            .map_err(|source| SelectionError::Store {
                source,
                draft: draft.clone(),
                point,
            })?;

        let action = classify(point, draft, &snapshot)?;
        debug!(action = action.name(), %point, "Classified point");
        Ok(Selection {
            draft: draft.clone(),
            point,
            action,
        })
    }

    /// Apply a classified selection
    pub async fn resolve(
        &self,
        selection: &Selection,
        actor: Option<&Identity>,
        guard: Option<&AnonymousGuard>,
    ) -> std::result::Result<SelectionOutcome, SelectionError> {
        self.resolver(guard).resolve(selection, actor).await
    }

    /// Confirm a report from a list or detail view
    pub async fn confirm_report(
        &self,
        id: &str,
        actor: Option<&Identity>,
        guard: Option<&AnonymousGuard>,
    ) -> Result<SelectionOutcome> {
        Ok(self.resolver(guard).confirm(id, actor).await?)
    }

    /// Realtime snapshots; the current one is delivered first
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Vec<Report>) + Send + 'static,
    {
        subscribe_reports(Arc::clone(&self.store), callback)
    }

    pub async fn service_status(&self, now: DateTime<Utc>) -> Result<Vec<ServiceStatus>> {
        let reports = self.store.list_reports().await?;
        Ok(feeds::service_status(&reports, now, &self.feeds))
    }

    /// Nearby feed around `origin`, or the configured default origin
    pub async fn nearby_reports(
        &self,
        origin: Option<Coordinates>,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyReport>> {
        let origin = origin.unwrap_or(self.feeds.default_origin);
        let reports = self.store.list_reports().await?;
        Ok(feeds::nearby_reports(&reports, &origin, now, &self.feeds))
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.store.health_check().await?)
    }

    fn resolver<'a>(&'a self, guard: Option<&'a AnonymousGuard>) -> Resolver<'a> {
        let resolver = Resolver::new(self.store.as_ref());
        match guard {
            Some(guard) => resolver.with_guard(guard),
            None => resolver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DedupAction;
    use crate::geo::{DEFAULT_ORIGIN, offset_meters};
    use crate::geocoding::GeocodeError;
    use crate::models::ServiceType;
    use crate::storage::MemoryReportStore;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Named(&'static str);

    #[async_trait]
    impl Geocoder for Named {
        async fn reverse_geocode(&self, _point: &Coordinates) -> std::result::Result<String, GeocodeError> {
            Ok(self.0.to_string())
        }
    }

    fn service() -> ReportService {
        ReportService::new(
            Arc::new(MemoryReportStore::new()),
            Arc::new(Named("Barrio Escalante, San José")),
            FeedConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_fills_creator_and_location_name() {
        let service = service();
        let identity = Identity::new("user-1").with_display_name("Ana");
        let payload = NewReport::from_draft(
            &ReportDraft::new(ServiceType::Electricity, "CNFL"),
            DEFAULT_ORIGIN,
            &Identity::new("spoofed"),
        )
        .unwrap();

        let report = service.create_report(&identity, payload).await.unwrap();
        assert_eq!(report.user_id, "user-1");
        assert_eq!(report.location_name.as_deref(), Some("Barrio Escalante, San José"));
        assert_eq!(report.confirmations, 0);
    }

    #[tokio::test]
    async fn test_create_keeps_given_location_name() {
        let service = service();
        let identity = Identity::new("user-1");
        let report = service
            .create_from_draft(
                &identity,
                &ReportDraft::new(ServiceType::Water, "AyA"),
                DEFAULT_ORIGIN,
                Some("Sin agua".to_string()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(report.display_title(), "Sin agua");

        let named = NewReport::from_draft(&ReportDraft::new(ServiceType::Water, "AyA"), DEFAULT_ORIGIN, &identity)
            .unwrap()
            .with_location_name("Mi casa");
        let report = service.create_report(&identity, named).await.unwrap();
        assert_eq!(report.location_name.as_deref(), Some("Mi casa"));
    }

    #[tokio::test]
    async fn test_classify_then_resolve_confirms() {
        let service = service();
        let creator = Identity::new("creator");
        let existing = service
            .create_from_draft(&creator, &ReportDraft::new(ServiceType::Water, "AyA"), DEFAULT_ORIGIN, None, None)
            .await
            .unwrap();

        let draft = ReportDraft::new(ServiceType::Water, "AyA");
        let selection = service
            .classify(offset_meters(&DEFAULT_ORIGIN, 20.0, 0.0), &draft)
            .await
            .unwrap();
        assert!(matches!(selection.action, DedupAction::ConfirmExisting { .. }));

        let neighbor = Identity::new("neighbor");
        let outcome = service.resolve(&selection, Some(&neighbor), None).await.unwrap();
        assert!(matches!(outcome, SelectionOutcome::Confirmed { ref report } if report.id == existing.id));

        let again = service
            .confirm_report(&existing.id, Some(&neighbor), None)
            .await
            .unwrap();
        assert_eq!(
            again,
            SelectionOutcome::AlreadyConfirmed {
                report_id: existing.id.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_get_missing_report_is_not_found() {
        let err = service().get_report("missing").await.unwrap_err();
        assert!(matches!(err, OutageMapError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_nearby_defaults_to_configured_origin() {
        let service = service();
        let identity = Identity::new("creator");
        service
            .create_from_draft(
                &identity,
                &ReportDraft::new(ServiceType::Internet, "Kolbi"),
                offset_meters(&DEFAULT_ORIGIN, 300.0, 0.0),
                None,
                None,
            )
            .await
            .unwrap();

        let nearby = service.nearby_reports(None, Utc::now()).await.unwrap();
        assert_eq!(nearby.len(), 1);

        let status = service.service_status(Utc::now()).await.unwrap();
        let internet = status
            .iter()
            .find(|s| s.service_type == ServiceType::Internet)
            .unwrap();
        assert_eq!(internet.count, 1);
    }
}
