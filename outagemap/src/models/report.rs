//! Outage report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::service::{Providers, ServiceType, append_provider};
use crate::geo::Coordinates;

/// Validation failures for drafts and creation payloads
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("incomplete draft: missing {0}")]
    IncompleteDraft(&'static str),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("{0}")]
    Invalid(String),
}

/// A community outage report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    /// Store-assigned identifier
    pub id: String,

    pub service_type: ServiceType,

    /// One provider, or several joined by " + " in merge order
    pub provider: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Fixed at creation
    pub location: Coordinates,

    /// Best-effort place name
    #[serde(default)]
    pub location_name: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Total confirmations, anonymous ones included
    #[serde(default)]
    pub confirmations: u32,

    /// Signed-in users that confirmed this report
    #[serde(default)]
    pub confirmed_by: Vec<String>,

    pub user_id: String,

    #[serde(default)]
    pub user_name: Option<String>,
}

impl Report {
    /// Build a report from a creation payload
    pub fn from_new(id: impl Into<String>, new_report: NewReport, created_at: DateTime<Utc>) -> Self {
        let title = Some(new_report.resolved_title());
        Self {
            id: id.into(),
            service_type: new_report.service_type,
            provider: new_report.provider,
            title,
            description: new_report.description,
            location: new_report.location,
            location_name: new_report.location_name,
            created_at,
            confirmations: 0,
            confirmed_by: Vec::new(),
            user_id: new_report.user_id,
            user_name: new_report.user_name,
        }
    }

    pub fn providers(&self) -> Providers<'_> {
        Providers::new(&self.provider)
    }

    pub fn is_confirmed_by(&self, user_id: &str) -> bool {
        self.confirmed_by.iter().any(|u| u == user_id)
    }

    pub fn is_own(&self, identity: &Identity) -> bool {
        self.user_id == identity.id
    }

    /// Title to display, falling back to "{label} - {provider}"
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => default_title(self.service_type, &self.provider),
        }
    }

    /// Place name to display, falling back to the coordinate string
    pub fn display_location(&self) -> String {
        match self.location_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self.location.to_string(),
        }
    }

    /// Record one confirmation.
    ///
    /// Returns `false` without changing anything when the signed-in actor
    /// already confirmed. Anonymous confirmations only bump the counter.
    pub fn apply_confirmation(&mut self, actor: Option<&str>) -> bool {
        if let Some(user_id) = actor {
            if self.is_confirmed_by(user_id) {
                return false;
            }
            self.confirmed_by.push(user_id.to_string());
        }
        self.confirmations += 1;
        true
    }

    /// Append a provider unless the current value already contains it
    pub fn apply_merge(&mut self, provider: &str) -> bool {
        if self.providers().contains(provider) {
            return false;
        }
        self.provider = append_provider(&self.provider, provider);
        true
    }
}

/// Default title for a report without one
pub fn default_title(service_type: ServiceType, provider: &str) -> String {
    format!("{} - {}", service_type.label(), provider)
}

/// The in-progress report a user fills before picking a location
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportDraft {
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub provider: String,
}

impl ReportDraft {
    pub fn new(service_type: ServiceType, provider: impl Into<String>) -> Self {
        Self {
            service_type: Some(service_type),
            provider: provider.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// The completed service type and trimmed provider
    pub fn validate(&self) -> Result<(ServiceType, &str), ValidationError> {
        let service_type = self
            .service_type
            .ok_or(ValidationError::IncompleteDraft("service type"))?;
        let provider = self.provider.trim();
        if provider.is_empty() {
            return Err(ValidationError::IncompleteDraft("provider"));
        }
        Ok((service_type, provider))
    }
}

/// Payload for creating a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReport {
    pub service_type: ServiceType,
    pub provider: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Coordinates,
    #[serde(default)]
    pub location_name: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl NewReport {
    /// Start a payload from a completed draft, a location and the creator
    pub fn from_draft(
        draft: &ReportDraft,
        location: Coordinates,
        identity: &Identity,
    ) -> Result<Self, ValidationError> {
        let (service_type, provider) = draft.validate()?;
        Ok(Self {
            service_type,
            provider: provider.to_string(),
            title: None,
            description: None,
            location,
            location_name: None,
            user_id: identity.id.clone(),
            user_name: identity.display_name().map(str::to_string),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// The title, or "{label} - {provider}" when blank
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => default_title(self.service_type, &self.provider),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider.trim().is_empty() {
            return Err(ValidationError::IncompleteDraft("provider"));
        }
        if !self.location.is_valid() {
            return Err(ValidationError::InvalidCoordinates(format!(
                "{}, {}",
                self.location.latitude, self.location.longitude
            )));
        }
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::Invalid(
                "a signed-in user is required to create reports".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        let identity = Identity::new("user-1").with_display_name("Ana");
        let new_report = NewReport::from_draft(
            &ReportDraft::new(ServiceType::Water, "AyA"),
            Coordinates::new(9.93, -84.08),
            &identity,
        )
        .unwrap();
        Report::from_new("r1", new_report, Utc::now())
    }

    #[test]
    fn test_default_title() {
        let report = sample();
        assert_eq!(report.title.as_deref(), Some("Water - AyA"));
        assert_eq!(report.user_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_explicit_title_kept() {
        let new_report = NewReport::from_draft(
            &ReportDraft::new(ServiceType::Electricity, "ICE"),
            Coordinates::new(9.93, -84.08),
            &Identity::new("u"),
        )
        .unwrap()
        .with_title("No power on 5th avenue");
        assert_eq!(new_report.resolved_title(), "No power on 5th avenue");

        let blank = new_report.clone().with_title("   ");
        assert_eq!(blank.resolved_title(), "Electricity - ICE");
    }

    #[test]
    fn test_draft_validation() {
        assert_eq!(
            ReportDraft::default().validate(),
            Err(ValidationError::IncompleteDraft("service type"))
        );
        let draft = ReportDraft {
            service_type: Some(ServiceType::Water),
            provider: "  ".to_string(),
        };
        assert_eq!(draft.validate(), Err(ValidationError::IncompleteDraft("provider")));
        assert!(ReportDraft::new(ServiceType::Water, "AyA").is_complete());
    }

    #[test]
    fn test_confirmation_rules() {
        let mut report = sample();
        assert!(report.apply_confirmation(Some("u2")));
        assert!(!report.apply_confirmation(Some("u2")));
        assert!(report.apply_confirmation(None));
        assert!(report.apply_confirmation(None));

        assert_eq!(report.confirmations, 3);
        assert_eq!(report.confirmed_by, vec!["u2".to_string()]);
        assert!(report.confirmations as usize >= report.confirmed_by.len());
    }

    #[test]
    fn test_merge_rules() {
        let mut report = sample();
        assert!(report.apply_merge("Municipalidad"));
        assert_eq!(report.provider, "AyA + Municipalidad");
        assert!(!report.apply_merge("Municipalidad"));
        assert_eq!(report.provider, "AyA + Municipalidad");
        assert!(report.providers().is_merged());
    }

    #[test]
    fn test_invalid_location_rejected() {
        let new_report = NewReport::from_draft(
            &ReportDraft::new(ServiceType::Water, "AyA"),
            Coordinates::new(f64::NAN, -84.0),
            &Identity::new("u"),
        )
        .unwrap();
        assert!(matches!(
            new_report.validate(),
            Err(ValidationError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_display_location_fallback() {
        let mut report = sample();
        assert_eq!(report.display_location(), "9.9300, -84.0800");
        report.location_name = Some("Barrio Escalante, San José".to_string());
        assert_eq!(report.display_location(), "Barrio Escalante, San José");
    }
}
