//! # OutageMap
//!
//! Community reports of utility outages (electricity, water, internet and
//! other services) pinned to a map. When someone picks a point, nearby
//! reports for the same service are found and the pick becomes a
//! confirmation of an existing report, a provider merge into it, or a new
//! report.
//!
//! ## Quick Start
//!
//! ```rust
//! use outagemap::prelude::*;
//!
//! async fn example() -> Result<()> {
//!     let config = ConfigBuilder::testing().build()?;
//!     let service = init(config).await?;
//!
//!     let ana = Identity::new("user-1").with_display_name("Ana");
//!     let draft = ReportDraft::new(ServiceType::Water, "AyA");
//!
//!     let selection = service.classify(DEFAULT_ORIGIN, &draft).await?;
//!     if let SelectionOutcome::ReadyToCreate { point } =
//!         service.resolve(&selection, Some(&ana), None).await?
//!     {
//!         service.create_from_draft(&ana, &draft, point, None, None).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **dedup**: the classification engine, resolver and selection session
//! - **storage**: the `ReportStore` trait with SurrealDB and in-memory backends
//! - **guard**: per-device memory of anonymous confirmations
//! - **geocoding**: reverse geocoding with a coordinate fallback
//! - **feeds**: service status and nearby report feeds
//! - **service**: the `ReportService` façade used by the CLI and server

pub mod config;
pub mod dedup;
pub mod feeds;
pub mod geo;
pub mod geocoding;
pub mod guard;
pub mod logging;
pub mod models;
pub mod service;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{ConfigBuilder, LogLevel, OutageMapConfig, StorageEngine};

    pub use crate::dedup::{
        DedupAction, Resolver, Selection, SelectionError, SelectionOutcome, SelectionSession,
        classify,
    };

    pub use crate::geo::{Coordinates, DEFAULT_ORIGIN, EXACT_LOCATION_THRESHOLD_M};

    pub use crate::guard::AnonymousGuard;

    pub use crate::models::{Identity, NewReport, Report, ReportDraft, ServiceType};

    pub use crate::service::ReportService;

    pub use crate::storage::{MemoryReportStore, ReportStore, StorageError, Subscription};

    pub use crate::{OutageMapError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for OutageMap operations
#[derive(Debug, thiserror::Error)]
pub enum OutageMapError {
    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid draft, payload or coordinates
    #[error("Validation error: {0}")]
    Validation(#[from] models::ValidationError),

    /// Classification or resolution failed
    #[error(transparent)]
    Selection(#[from] dedup::SelectionError),

    /// Geocoder could not be built
    #[error("Geocoding error: {0}")]
    Geocoding(#[from] geocoding::GeocodeError),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),

    /// Anonymous guard could not be read or written
    #[error("Guard error: {0}")]
    Guard(#[from] guard::GuardError),
}

impl From<config::ConfigError> for OutageMapError {
    fn from(err: config::ConfigError) -> Self {
        OutageMapError::Configuration(err.to_string())
    }
}

impl OutageMapError {
    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            OutageMapError::Storage(e) => e.is_retryable(),
            OutageMapError::Selection(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for OutageMap operations
pub type Result<T> = std::result::Result<T, OutageMapError>;

/// Initialize OutageMap with default configuration (files, then environment)
pub async fn init_with_defaults() -> Result<service::ReportService> {
    let config = config::load_config()?;
    init(config).await
}

/// Initialize logging and build the report service for `config`
///
/// # Examples
///
/// ```rust
/// use outagemap::prelude::*;
///
/// async fn example() -> Result<()> {
///     let config = ConfigBuilder::new().with_memory_storage().build()?;
///     let service = init(config).await?;
///     assert!(service.list_reports().await?.is_empty());
///     Ok(())
/// }
/// ```
pub async fn init(config: config::OutageMapConfig) -> Result<service::ReportService> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    service::ReportService::from_config(&config).await
}
