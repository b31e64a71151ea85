//! Domain models for reports, service types and identities

pub mod identity;
pub mod report;
pub mod service;

// Re-export important models
pub use identity::{Identity, IdentityProvider, StaticIdentityProvider};
pub use report::{NewReport, Report, ReportDraft, ValidationError, default_title};
pub use service::{PROVIDER_SEPARATOR, Providers, ServiceType, UnknownServiceType};
