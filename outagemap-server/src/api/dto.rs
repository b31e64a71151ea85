//! Data Transfer Objects for the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use outagemap::feeds::{NearbyReport, ServiceStatus, format_distance, format_time_ago};
use outagemap::geo::Coordinates;
use outagemap::models::{NewReport, Report, ReportDraft, ServiceType};

use crate::error::{ServerError, bad_request};

pub use crate::error::ErrorResponse;

fn parse_service_type(raw: &str) -> Result<ServiceType, ServerError> {
    raw.parse()
        .map_err(|_| bad_request(&format!("Unknown service type '{}'", raw)))
}

/// Report DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDto {
    /// Unique identifier for the report
    pub id: String,

    /// Service type: electricity, water, internet or other
    pub service_type: String,

    /// Human readable service label
    pub service_label: String,

    /// Provider string, possibly several providers joined by " + "
    pub provider: String,

    /// The provider string split into names
    pub providers: Vec<String>,

    /// Title, defaulting to "{label} - {provider}"
    pub title: String,

    pub description: Option<String>,

    pub latitude: f64,

    pub longitude: f64,

    /// Place name, or the coordinates when none is known
    pub location_name: String,

    pub created_at: DateTime<Utc>,

    /// Number of confirmations, anonymous ones included
    pub confirmations: u32,

    /// Signed-in users who confirmed
    pub confirmed_by: Vec<String>,

    /// Creator
    pub user_id: String,

    pub user_name: Option<String>,
}

impl From<Report> for ReportDto {
    fn from(report: Report) -> Self {
        Self {
            service_type: report.service_type.as_str().to_string(),
            service_label: report.service_type.label().to_string(),
            providers: report.providers().iter().map(str::to_string).collect(),
            title: report.display_title(),
            location_name: report.display_location(),
            latitude: report.location.latitude,
            longitude: report.location.longitude,
            id: report.id,
            provider: report.provider,
            description: report.description,
            created_at: report.created_at,
            confirmations: report.confirmations,
            confirmed_by: report.confirmed_by,
            user_id: report.user_id,
            user_name: report.user_name,
        }
    }
}

/// Request to create a new report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReportRequest {
    /// Service type (electricity, water, internet, other; Spanish names accepted)
    pub service_type: String,

    /// Affected provider
    pub provider: String,

    pub title: Option<String>,

    pub description: Option<String>,

    pub latitude: f64,

    pub longitude: f64,

    /// Place name; reverse geocoded when omitted
    pub location_name: Option<String>,
}

impl CreateReportRequest {
    /// Build the payload. The creator fields are filled in by the service.
    pub fn into_new_report(self) -> Result<NewReport, ServerError> {
        Ok(NewReport {
            service_type: parse_service_type(&self.service_type)?,
            provider: self.provider.trim().to_string(),
            title: self.title,
            description: self.description,
            location: Coordinates::new(self.latitude, self.longitude),
            location_name: self.location_name,
            user_id: String::new(),
            user_name: None,
        })
    }
}

/// A picked point and the draft it is classified for
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    /// Service type; may be omitted while the form is incomplete
    pub service_type: Option<String>,

    #[serde(default)]
    pub provider: String,

    pub latitude: f64,

    pub longitude: f64,
}

impl ClassifyRequest {
    pub fn draft(&self) -> Result<ReportDraft, ServerError> {
        let service_type = match self.service_type.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_service_type(raw)?),
            _ => None,
        };
        Ok(ReportDraft {
            service_type,
            provider: self.provider.clone(),
        })
    }

    pub fn point(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Service status feed entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatusDto {
    pub service_type: String,
    pub service_label: String,
    /// Reports in the status window
    pub count: usize,
    /// normal, minor, moderate or critical
    pub level: String,
}

impl From<ServiceStatus> for ServiceStatusDto {
    fn from(status: ServiceStatus) -> Self {
        Self {
            service_type: status.service_type.as_str().to_string(),
            service_label: status.service_type.label().to_string(),
            count: status.count,
            level: status.level.to_string(),
        }
    }
}

/// Nearby feed entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyReportDto {
    pub report: ReportDto,
    pub distance_m: f64,
    /// "420 m" or "2.3 km"
    pub distance: String,
    /// "12m ago", "5h ago" or "3d ago"
    pub age: String,
}

impl NearbyReportDto {
    pub fn new(nearby: NearbyReport, now: DateTime<Utc>) -> Self {
        Self {
            distance: format_distance(nearby.distance_m),
            age: format_time_ago(nearby.report.created_at, now),
            distance_m: nearby.distance_m,
            report: nearby.report.into(),
        }
    }
}

/// Origin for the nearby feed; the configured default is used when omitted
#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl NearbyParams {
    pub fn origin(&self) -> Result<Option<Coordinates>, ServerError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let origin = Coordinates::new(lat, lng);
                if !origin.is_valid() {
                    return Err(bad_request("Invalid origin coordinates"));
                }
                Ok(Some(origin))
            }
            (None, None) => Ok(None),
            _ => Err(bad_request("Both lat and lng are required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outagemap::models::Identity;

    #[test]
    fn test_report_dto_from_merged_report() {
        let new_report = NewReport::from_draft(
            &ReportDraft::new(ServiceType::Water, "AyA"),
            Coordinates::new(9.93456, -84.07891),
            &Identity::new("user-1"),
        )
        .unwrap();
        let mut report = Report::from_new("r1", new_report, Utc::now());
        report.apply_merge("Municipalidad");

        let dto = ReportDto::from(report);
        assert_eq!(dto.service_type, "water");
        assert_eq!(dto.providers, vec!["AyA", "Municipalidad"]);
        assert_eq!(dto.location_name, "9.9346, -84.0789");
    }

    #[test]
    fn test_classify_request_draft() {
        let request: ClassifyRequest = serde_json::from_value(serde_json::json!({
            "service_type": "agua",
            "provider": "AyA",
            "latitude": 9.93,
            "longitude": -84.07
        }))
        .unwrap();
        let draft = request.draft().unwrap();
        assert_eq!(draft.service_type, Some(ServiceType::Water));

        let incomplete: ClassifyRequest = serde_json::from_value(serde_json::json!({
            "latitude": 9.93,
            "longitude": -84.07
        }))
        .unwrap();
        assert!(!incomplete.draft().unwrap().is_complete());

        let unknown = ClassifyRequest {
            service_type: Some("gas".into()),
            provider: "X".into(),
            latitude: 0.0,
            longitude: 0.0,
        };
        assert!(unknown.draft().is_err());
    }

    #[test]
    fn test_nearby_params() {
        let both = NearbyParams {
            lat: Some(9.9),
            lng: Some(-84.0),
        };
        assert!(both.origin().unwrap().is_some());
        let neither = NearbyParams { lat: None, lng: None };
        assert!(neither.origin().unwrap().is_none());
        let one = NearbyParams {
            lat: Some(9.9),
            lng: None,
        };
        assert!(one.origin().is_err());
    }
}
