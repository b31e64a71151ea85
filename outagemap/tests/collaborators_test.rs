//! Tests for the collaborators around the engine: the geocoder used at
//! creation time, the persistent device guard and store failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use outagemap::config::FeedConfig;
use outagemap::geo::offset_meters;
use outagemap::geocoding::{GeocodeError, Geocoder};
use outagemap::prelude::*;
use outagemap::storage::ReportStream;

mock! {
    pub Geo {}

    #[async_trait]
    impl Geocoder for Geo {
        async fn reverse_geocode(&self, point: &Coordinates) -> std::result::Result<String, GeocodeError>;
    }
}

impl std::fmt::Debug for MockGeo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGeo").finish()
    }
}

/// Wraps the in-memory store and fails every call while `offline` is set
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryReportStore,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyStore {
    fn check(&self) -> std::result::Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("store unreachable".to_string()));
        }
        Ok(())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportStore for FlakyStore {
    async fn create_report(&self, new_report: NewReport) -> std::result::Result<Report, StorageError> {
        self.check()?;
        self.inner.create_report(new_report).await
    }

    async fn get_report(&self, id: &str) -> std::result::Result<Option<Report>, StorageError> {
        self.check()?;
        self.inner.get_report(id).await
    }

    async fn list_reports(&self) -> std::result::Result<Vec<Report>, StorageError> {
        self.check()?;
        self.inner.list_reports().await
    }

    async fn confirm_report(
        &self,
        id: &str,
        actor: Option<&str>,
    ) -> std::result::Result<Report, StorageError> {
        self.check()?;
        self.inner.confirm_report(id, actor).await
    }

    async fn merge_provider(
        &self,
        id: &str,
        provider: &str,
        actor: Option<&str>,
    ) -> std::result::Result<String, StorageError> {
        self.check()?;
        self.inner.merge_provider(id, provider, actor).await
    }

    fn subscribe(&self) -> ReportStream {
        self.inner.subscribe()
    }

    async fn health_check(&self) -> std::result::Result<bool, StorageError> {
        Ok(!self.offline.load(Ordering::SeqCst))
    }

    async fn clear(&self) -> std::result::Result<(), StorageError> {
        self.inner.clear().await
    }
}

fn water_aya() -> ReportDraft {
    ReportDraft::new(ServiceType::Water, "AyA")
}

/// Never answers
#[derive(Debug)]
struct StalledGeocoder;

#[async_trait]
impl Geocoder for StalledGeocoder {
    async fn reverse_geocode(&self, _point: &Coordinates) -> std::result::Result<String, GeocodeError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_location_name_comes_from_geocoder() {
    let mut geocoder = MockGeo::new();
    geocoder
        .expect_reverse_geocode()
        .times(1)
        .returning(|_| Ok("Los Yoses, San Pedro".to_string()));

    let service = ReportService::new(
        Arc::new(MemoryReportStore::new()),
        Arc::new(geocoder),
        FeedConfig::default(),
    );
    let report = service
        .create_from_draft(&Identity::new("ana"), &water_aya(), DEFAULT_ORIGIN, None, None)
        .await
        .unwrap();
    assert_eq!(report.location_name.as_deref(), Some("Los Yoses, San Pedro"));
}

#[tokio::test]
async fn test_geocoder_failure_falls_back_to_coordinates() {
    let mut geocoder = MockGeo::new();
    geocoder
        .expect_reverse_geocode()
        .times(1)
        .returning(|_| Err(GeocodeError::Status(503)));

    let service = ReportService::new(
        Arc::new(MemoryReportStore::new()),
        Arc::new(geocoder),
        FeedConfig::default(),
    );
    let point = Coordinates::new(9.93456, -84.07891);
    let report = service
        .create_from_draft(&Identity::new("ana"), &water_aya(), point, None, None)
        .await
        .unwrap();
    assert_eq!(report.location_name.as_deref(), Some("9.9346, -84.0789"));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_geocoder_does_not_block_creation() {
    let service = ReportService::new(
        Arc::new(MemoryReportStore::new()),
        Arc::new(StalledGeocoder),
        FeedConfig::default(),
    )
    .with_geocode_timeout(Duration::from_millis(500));

    let point = Coordinates::new(9.93456, -84.07891);
    let report = service
        .create_from_draft(&Identity::new("ana"), &water_aya(), point, None, None)
        .await
        .unwrap();
    assert_eq!(report.location_name.as_deref(), Some("9.9346, -84.0789"));
    assert_eq!(service.list_reports().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_named_payload_skips_geocoder() {
    let mut geocoder = MockGeo::new();
    geocoder.expect_reverse_geocode().times(0);

    let service = ReportService::new(
        Arc::new(MemoryReportStore::new()),
        Arc::new(geocoder),
        FeedConfig::default(),
    );
    let identity = Identity::new("ana");
    let payload = NewReport::from_draft(&water_aya(), DEFAULT_ORIGIN, &identity)
        .unwrap()
        .with_location_name("Curridabat");
    assert_ok!(service.create_report(&identity, payload).await);
}

#[tokio::test]
async fn test_store_failure_keeps_draft_and_point() {
    let store = Arc::new(FlakyStore::default());
    let service = ReportService::with_store(store.clone());
    let existing = service
        .create_from_draft(&Identity::new("creator"), &water_aya(), DEFAULT_ORIGIN, None, None)
        .await
        .unwrap();

    let point = offset_meters(&DEFAULT_ORIGIN, 10.0, 0.0);
    let selection = service.classify(point, &water_aya()).await.unwrap();

    store.offline.store(true, Ordering::SeqCst);
    let err = service.resolve(&selection, None, None).await.unwrap_err();
    assert!(err.is_retryable());
    match &err {
        SelectionError::Store { draft, point: kept, .. } => {
            assert_eq!(draft, &water_aya());
            assert_eq!(*kept, point);
        }
        other => panic!("expected a store error, got {:?}", other),
    }

    // Same selection succeeds once the store is back
    store.offline.store(false, Ordering::SeqCst);
    let outcome = service.resolve(&selection, None, None).await.unwrap();
    assert!(matches!(outcome, SelectionOutcome::Confirmed { ref report } if report.id == existing.id));
}

#[tokio::test]
async fn test_session_keeps_selection_after_store_failure() {
    let store = Arc::new(FlakyStore::default());
    let service = ReportService::with_store(store.clone());
    service
        .create_from_draft(&Identity::new("creator"), &water_aya(), DEFAULT_ORIGIN, None, None)
        .await
        .unwrap();
    let snapshot = service.list_reports().await.unwrap();

    let mut session = SelectionSession::new();
    session.begin(water_aya());
    let point = offset_meters(&DEFAULT_ORIGIN, 5.0, 5.0);
    session.select_point(point, &snapshot);

    let resolver = Resolver::new(store.as_ref());
    store.offline.store(true, Ordering::SeqCst);
    assert_err!(session.commit(&resolver, None).await);
    assert!(session.is_selecting());
    assert_eq!(session.pending().map(|s| s.point), Some(point));

    store.offline.store(false, Ordering::SeqCst);
    assert_ok!(session.commit(&resolver, None).await);
    assert!(!session.is_selecting());
}

#[tokio::test]
async fn test_validation_and_cancel_make_no_store_calls() {
    let store = Arc::new(FlakyStore::default());
    let service = ReportService::with_store(store.clone());
    service
        .create_from_draft(&Identity::new("creator"), &water_aya(), DEFAULT_ORIGIN, None, None)
        .await
        .unwrap();
    let snapshot = service.list_reports().await.unwrap();
    let before = store.calls();

    let mut session = SelectionSession::new();
    session.begin(ReportDraft::default());
    let result = session.select_point(DEFAULT_ORIGIN, &snapshot).unwrap();
    assert!(result.is_err());

    session.begin(water_aya());
    session.select_point(DEFAULT_ORIGIN, &snapshot);
    session.cancel();
    let resolver = Resolver::new(store.as_ref());
    assert_err!(session.commit(&resolver, None).await);

    assert_eq!(store.calls(), before);
    let stored = store.inner.list_reports().await.unwrap();
    assert_eq!(stored[0].confirmations, 0);
}

#[tokio::test]
async fn test_file_guard_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("device_state.json");
    let service = ReportService::with_store(Arc::new(MemoryReportStore::new()));
    let existing = service
        .create_from_draft(&Identity::new("creator"), &water_aya(), DEFAULT_ORIGIN, None, None)
        .await
        .unwrap();

    {
        let guard = AnonymousGuard::file(&path);
        let outcome = service
            .confirm_report(&existing.id, None, Some(&guard))
            .await
            .unwrap();
        assert!(matches!(outcome, SelectionOutcome::Confirmed { .. }));
    }

    let reopened = AnonymousGuard::file(&path);
    assert!(reopened.has_confirmed(&existing.id));
    let outcome = service
        .confirm_report(&existing.id, None, Some(&reopened))
        .await
        .unwrap();
    assert!(matches!(outcome, SelectionOutcome::AlreadyConfirmed { .. }));
    assert_eq!(service.get_report(&existing.id).await.unwrap().confirmations, 1);
}

#[tokio::test]
async fn test_tampered_selection_is_rejected_before_the_store() {
    let store = Arc::new(FlakyStore::default());
    let service = ReportService::with_store(store.clone());
    let existing = service
        .create_from_draft(&Identity::new("creator"), &water_aya(), DEFAULT_ORIGIN, None, None)
        .await
        .unwrap();
    let point = offset_meters(&DEFAULT_ORIGIN, 10.0, 0.0);
    let before = store.calls();

    // Merge with an empty draft
    let empty_draft = Selection {
        draft: ReportDraft::default(),
        point,
        action: DedupAction::MergeProvider {
            report: existing.clone(),
            provider: "Anything At All".to_string(),
        },
    };
    let err = service.resolve(&empty_draft, None, None).await.unwrap_err();
    assert!(matches!(err, SelectionError::Validation(_)));

    // Merge provider that is not the draft's provider
    let other_provider = Selection {
        draft: ReportDraft::new(ServiceType::Water, "Municipalidad"),
        point,
        action: DedupAction::MergeProvider {
            report: existing.clone(),
            provider: "Someone Else".to_string(),
        },
    };
    let err = service.resolve(&other_provider, None, None).await.unwrap_err();
    assert!(matches!(err, SelectionError::Validation(_)));

    // Confirmation of a report for another service
    let other_service = Selection {
        draft: ReportDraft::new(ServiceType::Electricity, "AyA"),
        point,
        action: DedupAction::ConfirmExisting {
            report: existing.clone(),
        },
    };
    let err = service.resolve(&other_service, None, None).await.unwrap_err();
    assert!(matches!(err, SelectionError::Validation(_)));

    assert_eq!(store.calls(), before);
    let stored = store.inner.get_report(&existing.id).await.unwrap().unwrap();
    assert_eq!(stored.provider, "AyA");
    assert_eq!(stored.confirmations, 0);
}
